/// Notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid recipient key: {0}")]
    InvalidRecipient(String),

    #[error("invoice has no preimage; receipt requires a settled invoice")]
    MissingPreimage,

    #[error("invoice has not settled")]
    NotSettled,

    #[error("receipt encryption failed: {0}")]
    Encryption(String),

    #[error("relay error: {0}")]
    Relay(String),
}
