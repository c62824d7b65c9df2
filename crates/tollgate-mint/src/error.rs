use tollgate_challenger::ChallengerError;
use tollgate_core::CoreError;

/// Minting and verification errors.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    #[error("invalid service set: {0}")]
    InvalidServices(#[from] CoreError),

    #[error("unable to obtain payment challenge: {0}")]
    ChallengeCreation(#[source] ChallengerError),

    #[error("unable to sign token: {0}")]
    Signing(String),

    #[error("token is not authorized: {0}")]
    Unauthorized(String),

    #[error("payment has not settled: {0}")]
    PaymentNotSettled(#[source] ChallengerError),

    #[error("token validity window has lapsed")]
    Expired,

    #[error("malformed token encoding: {0}")]
    Encoding(String),
}
