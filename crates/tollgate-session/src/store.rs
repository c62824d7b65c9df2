use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::SessionError;

/// Persisted session material, enough to resume a previously paired
/// session without re-entering the pairing phrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Hex-encoded local static key seed.
    pub local_static_seed: String,
    /// Hex-encoded static key of the remote peer, once known.
    pub remote_static_key: Option<String>,
    /// When the session expires, if the remote imposed a lifetime.
    pub expiry: Option<DateTime<Utc>>,
}

/// External store for session state. The transport borrows the credential
/// for the connection's lifetime; the store owns it.
pub trait SessionStore: Send + Sync {
    /// Load the persisted session state, if any.
    fn load(&self) -> Result<Option<SessionState>, SessionError>;

    /// Persist the session state.
    fn save(&self, state: &SessionState) -> Result<(), SessionError>;
}

/// In-memory session store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<Option<SessionState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<SessionState>, SessionError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| SessionError::Store("store lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| SessionError::Store("store lock poisoned".into()))?;
        *guard = Some(state.clone());
        Ok(())
    }
}
