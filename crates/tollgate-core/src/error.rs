/// Core type errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("at least one service is required")]
    NoServices,

    #[error("invalid price for service {service}: {price}")]
    InvalidPrice { service: String, price: i64 },

    #[error("invalid payment hash: {0}")]
    InvalidHash(String),

    #[error("invalid preimage: {0}")]
    InvalidPreimage(String),

    #[error("invalid invoice state: {0}")]
    InvalidState(String),
}
