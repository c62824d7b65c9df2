//! Tollgate settlement layer
//!
//! Defines the abstract boundary to the external settlement backend that
//! issues and tracks payment challenges, the accessor seam for obtaining a
//! usable client handle, and an in-memory mock backend for tests.

pub mod accessor;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use accessor::{ClientAccessor, DirectAccessor};
pub use error::SettlementError;
pub use mock::MockBackend;
pub use traits::SettlementBackend;
pub use types::Invoice;
