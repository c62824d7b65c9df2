//! Tollgate challenger
//!
//! The payment-challenge lifecycle manager: creates invoices against a
//! settlement backend, watches backend health from a background task, and
//! exposes the invoice-status verification contract the access-control
//! layer relies on. Two interchangeable variants share one contract: a
//! direct-connection challenger and a session-tunneled wrapper around it.

pub mod config;
pub mod direct;
pub mod error;
pub mod session;
pub mod traits;

pub use config::ChallengerConfig;
pub use direct::DirectChallenger;
pub use error::ChallengerError;
pub use session::SessionChallenger;
pub use traits::{default_invoice_request, Challenger, InvoiceChecker, InvoiceRequest, InvoiceRequestFn};
