use std::fmt;

use crate::error::CoreError;

/// The settlement lifecycle of a payment challenge, as tracked by the
/// backend. This system only reads these states; transitions are driven
/// exclusively by the backend, and Settled never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum InvoiceState {
    /// Invoice created, no payment seen yet.
    Open,
    /// A payment is in flight but not yet settled.
    Pending,
    /// Payment settled — the challenge is satisfied. Terminal.
    Settled,
    /// Invoice canceled or expired. Terminal.
    Canceled,
}

impl InvoiceState {
    /// Whether this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Canceled)
    }

    /// Parse from the backend's string representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "settled" => Ok(Self::Settled),
            "canceled" => Ok(Self::Canceled),
            other => Err(CoreError::InvalidState(other.to_string())),
        }
    }
}

impl fmt::Display for InvoiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Pending => write!(f, "pending"),
            Self::Settled => write!(f, "settled"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}
