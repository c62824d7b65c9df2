use tollgate_core::PaymentHash;

/// Settlement-backend errors.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("invalid invoice amount: {0} sat")]
    InvalidAmount(i64),

    #[error("invoice not found: {0}")]
    InvoiceNotFound(PaymentHash),

    #[error("backend unreachable: {0}")]
    BackendDown(String),

    #[error("not connected to the settlement backend")]
    NotConnected,

    #[error("invoice rejected by backend: {0}")]
    Rejected(String),
}
