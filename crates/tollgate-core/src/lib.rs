pub mod error;
pub mod memo;
pub mod state;
pub mod types;

pub use error::CoreError;
pub use memo::MemoParams;
pub use state::InvoiceState;
pub use types::{total_price, PaymentHash, Preimage, Price, Service, ServiceTier};
