use async_trait::async_trait;
use std::time::Duration;
use tollgate_core::{InvoiceState, MemoParams, PaymentHash, Price};

use crate::error::ChallengerError;

/// The invoice request handed to the settlement backend.
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    /// Invoice amount.
    pub amount: Price,
    /// Rendered memo.
    pub memo: String,
}

/// Renders a price and memo parameters into a backend invoice request.
/// Lets deployments customize memos without touching challenge logic.
pub type InvoiceRequestFn = Box<dyn Fn(Price, &MemoParams) -> InvoiceRequest + Send + Sync>;

/// The stock invoice request generator: amount as given, memo rendered
/// from the parameters.
pub fn default_invoice_request() -> InvoiceRequestFn {
    Box::new(|price, params| InvoiceRequest {
        amount: price,
        memo: params.render(),
    })
}

/// The capability the access-control layer consumes: confirm a payment
/// reached the desired settlement state within a deadline.
#[async_trait]
pub trait InvoiceChecker: Send + Sync {
    /// Poll the backend's record for `hash` until its state equals
    /// `desired` or `timeout` elapses.
    ///
    /// Settlement-state propagation is eventually consistent relative to
    /// the payer learning "payment complete", so a single point-in-time
    /// read is unreliable; the caller's timeout is authoritative.
    async fn verify_invoice_status(
        &self,
        hash: PaymentHash,
        desired: InvoiceState,
        timeout: Duration,
    ) -> Result<(), ChallengerError>;
}

/// The challenge lifecycle contract. Any variant satisfies the
/// `InvoiceChecker` capability as well.
#[async_trait]
pub trait Challenger: InvoiceChecker {
    /// Create a new payment challenge of the given price, returning the
    /// encoded payment request and its unique payment identifier.
    async fn new_challenge(
        &self,
        price: Price,
        params: &MemoParams,
    ) -> Result<(String, PaymentHash), ChallengerError>;

    /// Stop the challenger and its background task. Idempotent.
    async fn stop(&self);
}
