use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use tollgate_core::{InvoiceState, MemoParams, PaymentHash, Price};
use tollgate_settlement::ClientAccessor;

use crate::config::ChallengerConfig;
use crate::error::ChallengerError;
use crate::traits::{Challenger, InvoiceChecker, InvoiceRequestFn};

/// Lifecycle of a challenger instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Running,
    Stopped,
}

/// The canonical challenger over a direct backend connection.
///
/// One instance serves one backend and is shared across all concurrent
/// mint and verification tasks. A background monitor checks backend
/// liveness for the challenger's lifetime and reports an unrecoverable
/// disconnection exactly once on the owner-supplied error channel; the
/// challenger never silently reconnects.
pub struct DirectChallenger {
    accessor: Arc<dyn ClientAccessor>,
    invoice_gen: InvoiceRequestFn,
    config: ChallengerConfig,
    state: Mutex<State>,
    err_tx: Mutex<Option<mpsc::Sender<ChallengerError>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    monitor: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl DirectChallenger {
    /// Create a challenger in the `Created` state. `err_tx` is where the
    /// background monitor reports an unrecoverable backend error.
    pub fn new(
        accessor: Arc<dyn ClientAccessor>,
        invoice_gen: InvoiceRequestFn,
        err_tx: mpsc::Sender<ChallengerError>,
        config: ChallengerConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            accessor,
            invoice_gen,
            config,
            state: Mutex::new(State::Created),
            err_tx: Mutex::new(Some(err_tx)),
            shutdown_tx,
            shutdown_rx,
            monitor: tokio::sync::Mutex::new(None),
        }
    }

    fn state(&self) -> State {
        *self.state.lock().expect("challenger state lock poisoned")
    }

    fn set_state(&self, state: State) {
        *self.state.lock().expect("challenger state lock poisoned") = state;
    }

    /// Transition `Created → Running`: verify the backend handle is usable
    /// and launch the liveness monitor.
    pub async fn start(&self) -> Result<(), ChallengerError> {
        if self.state() != State::Created {
            return Err(ChallengerError::Start(
                "challenger already started".into(),
            ));
        }

        let client = self
            .accessor
            .client()
            .await
            .map_err(|e| ChallengerError::Start(format!("backend handle unusable: {}", e)))?;
        client
            .ping()
            .await
            .map_err(|e| ChallengerError::Start(format!("backend liveness check failed: {}", e)))?;

        let err_tx = self
            .err_tx
            .lock()
            .expect("challenger state lock poisoned")
            .take()
            .ok_or_else(|| ChallengerError::Start("challenger already started".into()))?;

        let accessor = Arc::clone(&self.accessor);
        let mut shutdown_rx = self.shutdown_rx.clone();
        let monitor_interval = self.config.monitor_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor_interval);
            // The first tick fires immediately; the start-time ping already
            // covered it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        tracing::debug!("challenger monitor shutting down");
                        return;
                    }
                    _ = ticker.tick() => {
                        let result = match accessor.client().await {
                            Ok(client) => client.ping().await,
                            Err(e) => Err(e),
                        };
                        if let Err(e) = result {
                            tracing::error!(error = %e, "settlement backend lost");
                            // Report once, then terminate; reconnection is
                            // the owner's decision.
                            let _ = err_tx.send(ChallengerError::BackendUnavailable(e)).await;
                            return;
                        }
                    }
                }
            }
        });

        *self.monitor.lock().await = Some(handle);
        self.set_state(State::Running);
        tracing::info!("challenger started");
        Ok(())
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}

#[async_trait]
impl InvoiceChecker for DirectChallenger {
    async fn verify_invoice_status(
        &self,
        hash: PaymentHash,
        desired: InvoiceState,
        timeout: Duration,
    ) -> Result<(), ChallengerError> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut consecutive_failures: u32 = 0;

        loop {
            if self.is_shutdown() {
                return Err(ChallengerError::Shutdown);
            }

            let lookup = async {
                let client = self.accessor.client().await?;
                client.lookup_invoice(hash).await
            };

            tokio::select! {
                result = lookup => match result {
                    Ok(invoice) => {
                        consecutive_failures = 0;
                        if invoice.state == desired {
                            return Ok(());
                        }
                        if invoice.state.is_terminal() {
                            // The desired state can never be reached now;
                            // fail fast instead of waiting out the timeout.
                            return Err(ChallengerError::InvalidState {
                                have: invoice.state,
                                want: desired,
                            });
                        }
                    }
                    Err(e) => {
                        // Transient lookup hiccups must not fail the wait;
                        // retry until the caller's deadline decides.
                        consecutive_failures += 1;
                        tracing::debug!(
                            hash = %hash,
                            error = %e,
                            "invoice lookup failed, retrying"
                        );
                        if consecutive_failures % 10 == 0 {
                            tracing::warn!(
                                hash = %hash,
                                failures = consecutive_failures,
                                "invoice lookups failing persistently"
                            );
                        }
                    }
                },
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(ChallengerError::DeadlineExceeded { want: desired });
                }
                _ = shutdown_rx.changed() => {
                    return Err(ChallengerError::Shutdown);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(ChallengerError::DeadlineExceeded { want: desired });
                }
                _ = shutdown_rx.changed() => {
                    return Err(ChallengerError::Shutdown);
                }
            }
        }
    }
}

#[async_trait]
impl Challenger for DirectChallenger {
    async fn new_challenge(
        &self,
        price: Price,
        params: &MemoParams,
    ) -> Result<(String, PaymentHash), ChallengerError> {
        if self.is_shutdown() {
            return Err(ChallengerError::Shutdown);
        }

        let client = self
            .accessor
            .client()
            .await
            .map_err(ChallengerError::BackendUnavailable)?;

        let request = (self.invoice_gen)(price, params);
        let (hash, payment_request) = client
            .create_invoice(request.amount, &request.memo)
            .await
            .map_err(ChallengerError::InvoiceCreation)?;

        tracing::debug!(hash = %hash, amount = %request.amount, "new payment challenge");
        Ok((payment_request, hash))
    }

    async fn stop(&self) {
        {
            let mut state = self.state.lock().expect("challenger state lock poisoned");
            match *state {
                State::Stopped => return,
                State::Created | State::Running => *state = State::Stopped,
            }
        }

        let _ = self.shutdown_tx.send(true);

        if let Some(mut handle) = self.monitor.lock().await.take() {
            match tokio::time::timeout(self.config.stop_grace, &mut handle).await {
                Ok(_) => tracing::info!("challenger stopped"),
                Err(_) => {
                    tracing::warn!("challenger monitor did not exit in time, aborting");
                    handle.abort();
                }
            }
        }
    }
}
