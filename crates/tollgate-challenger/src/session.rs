use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use tollgate_core::{InvoiceState, MemoParams, PaymentHash, Price};
use tollgate_session::{
    PairingPhrase, SessionAccessor, SessionConnector, SessionStore, SessionTransport,
};

use crate::config::ChallengerConfig;
use crate::direct::DirectChallenger;
use crate::error::ChallengerError;
use crate::traits::{Challenger, InvoiceChecker, InvoiceRequestFn};

/// Challenger variant that reaches its backend through a session transport
/// instead of a direct connection.
///
/// Pure composition: all challenge logic delegates to a wrapped
/// `DirectChallenger` whose client accessor routes through the transport.
pub struct SessionChallenger {
    inner: DirectChallenger,
    transport: Arc<SessionTransport>,
}

impl SessionChallenger {
    /// Establish the session transport, then construct and start the
    /// wrapped direct challenger over it.
    pub async fn connect(
        phrase: &PairingPhrase,
        store: &dyn SessionStore,
        connector: &dyn SessionConnector,
        invoice_gen: InvoiceRequestFn,
        err_tx: mpsc::Sender<ChallengerError>,
        config: ChallengerConfig,
    ) -> Result<Self, ChallengerError> {
        let transport = Arc::new(SessionTransport::connect(phrase, store, connector).await?);
        let accessor = Arc::new(SessionAccessor::new(Arc::clone(&transport)));

        let inner = DirectChallenger::new(accessor, invoice_gen, err_tx, config);
        inner.start().await?;

        Ok(Self { inner, transport })
    }
}

#[async_trait]
impl InvoiceChecker for SessionChallenger {
    async fn verify_invoice_status(
        &self,
        hash: PaymentHash,
        desired: InvoiceState,
        timeout: Duration,
    ) -> Result<(), ChallengerError> {
        self.inner.verify_invoice_status(hash, desired, timeout).await
    }
}

#[async_trait]
impl Challenger for SessionChallenger {
    async fn new_challenge(
        &self,
        price: Price,
        params: &MemoParams,
    ) -> Result<(String, PaymentHash), ChallengerError> {
        self.inner.new_challenge(price, params).await
    }

    async fn stop(&self) {
        // Halt challenge issuance and the monitor first; only then release
        // the transport. A teardown failure is logged, not escalated.
        self.inner.stop().await;

        if let Err(e) = self.transport.disconnect() {
            tracing::error!(error = %e, "unable to disconnect session transport");
        }
    }
}
