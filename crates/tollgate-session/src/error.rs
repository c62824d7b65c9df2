/// Session transport errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid pairing phrase: {0}")]
    InvalidPairingPhrase(String),

    #[error("session handshake failed: {0}")]
    Handshake(String),

    #[error("session rejected by remote peer: {0}")]
    Rejected(String),

    #[error("session transport is not connected")]
    NotConnected,

    #[error("session store error: {0}")]
    Store(String),
}
