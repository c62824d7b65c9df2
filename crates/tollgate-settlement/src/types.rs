use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tollgate_core::{InvoiceState, PaymentHash, Preimage, Price};

/// A payment challenge as tracked by the settlement backend.
///
/// The backend owns this record; everything above the boundary only
/// observes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique payment identifier.
    pub payment_hash: PaymentHash,
    /// The settlement secret; revealed once the invoice settles.
    pub preimage: Option<Preimage>,
    /// Invoice amount.
    pub amount: Price,
    /// Memo shown to the payer.
    pub memo: String,
    /// Opaque encoded payment request handed to the payer.
    pub payment_request: String,
    /// Current settlement state.
    pub state: InvoiceState,
    /// When the invoice was created.
    pub created_at: DateTime<Utc>,
    /// When the invoice settled, if it has.
    pub settled_at: Option<DateTime<Utc>>,
    /// Amount actually paid, in millisatoshis (may overpay).
    pub amount_paid_msat: i64,
}

impl Invoice {
    /// Whether the invoice has settled.
    pub fn is_settled(&self) -> bool {
        self.state == InvoiceState::Settled
    }
}
