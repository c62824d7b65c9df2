//! Tollgate minter
//!
//! Issues access tokens bound to payment challenges and verifies presented
//! tokens fail-closed: signature, service authorization, validity window,
//! and settlement of the bound payment.

pub mod error;
pub mod minter;
pub mod token;

pub use error::MintError;
pub use minter::{Minter, VerificationParams};
pub use token::Token;
