//! Tollgate notifications
//!
//! After a payment challenge settles, the service can publish an encrypted
//! settlement receipt to a set of message relays. Delivery is best-effort:
//! each relay succeeds or fails on its own, and a failing relay never
//! blocks the rest.

pub mod error;
pub mod event;
pub mod publisher;
pub mod relay;

pub use error::NotifyError;
pub use event::ReceiptEvent;
pub use publisher::{ReceiptParams, ReceiptPublisher, RelayOutcome};
pub use relay::{MemoryRelay, Relay};
