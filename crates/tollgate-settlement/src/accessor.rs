use async_trait::async_trait;
use std::sync::Arc;

use crate::error::SettlementError;
use crate::traits::SettlementBackend;

/// Obtains a usable client handle to the settlement backend.
///
/// The direct variant wraps a pre-supplied handle; the session-backed
/// variant (in tollgate-session) must first establish its transport.
#[async_trait]
pub trait ClientAccessor: Send + Sync {
    /// A client handle, or an error if none can be obtained right now.
    async fn client(&self) -> Result<Arc<dyn SettlementBackend>, SettlementError>;
}

/// Accessor over a pre-supplied backend handle. Cannot fail once built.
pub struct DirectAccessor {
    backend: Arc<dyn SettlementBackend>,
}

impl DirectAccessor {
    /// Wrap an existing backend handle.
    pub fn new(backend: Arc<dyn SettlementBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ClientAccessor for DirectAccessor {
    async fn client(&self) -> Result<Arc<dyn SettlementBackend>, SettlementError> {
        Ok(Arc::clone(&self.backend))
    }
}
