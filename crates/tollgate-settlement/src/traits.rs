use async_trait::async_trait;
use tollgate_core::{PaymentHash, Price};

use crate::error::SettlementError;
use crate::types::Invoice;

/// The RPC boundary to an external settlement backend.
///
/// Implementations bridge to a concrete node (direct socket, tunneled
/// session, or the in-memory mock). All state transitions happen behind
/// this boundary; callers only read them.
#[async_trait]
pub trait SettlementBackend: Send + Sync {
    /// Create a new invoice for the given amount and memo.
    ///
    /// Returns the unique payment identifier and the encoded payment
    /// request. The backend guarantees identifier uniqueness.
    async fn create_invoice(
        &self,
        amount: Price,
        memo: &str,
    ) -> Result<(PaymentHash, String), SettlementError>;

    /// Look up the backend's record for a payment identifier.
    async fn lookup_invoice(&self, hash: PaymentHash) -> Result<Invoice, SettlementError>;

    /// Liveness probe used by the challenger's background monitor.
    async fn ping(&self) -> Result<(), SettlementError>;
}
