use tollgate_core::InvoiceState;
use tollgate_session::SessionError;
use tollgate_settlement::SettlementError;

/// Challenger errors.
#[derive(Debug, thiserror::Error)]
pub enum ChallengerError {
    #[error("unable to start challenger: {0}")]
    Start(String),

    #[error("settlement backend unavailable: {0}")]
    BackendUnavailable(#[source] SettlementError),

    #[error("invoice creation failed: {0}")]
    InvoiceCreation(#[source] SettlementError),

    #[error("deadline exceeded waiting for invoice state {want}")]
    DeadlineExceeded { want: InvoiceState },

    #[error("invoice reached terminal state {have} while waiting for {want}")]
    InvalidState {
        have: InvoiceState,
        want: InvoiceState,
    },

    #[error("challenger is shut down")]
    Shutdown,

    #[error("session transport error: {0}")]
    Session(#[from] SessionError),
}
