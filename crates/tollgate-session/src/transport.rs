use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tollgate_core::{PaymentHash, Price};
use tollgate_crypto::{derive_key, sign, verify, KeyPair, PublicKey, Signature};
use tollgate_settlement::{ClientAccessor, Invoice, SettlementBackend, SettlementError};

use crate::credential::PairingPhrase;
use crate::error::SessionError;
use crate::store::{SessionState, SessionStore};

const SESSION_KEY_CONTEXT: &str = "tollgate-session-static-key-v1";

/// Session key material derived from a pairing phrase or resumed from a
/// persisted session state.
pub struct SessionKeys {
    keypair: KeyPair,
}

impl SessionKeys {
    /// Derive fresh keys from a pairing phrase.
    pub fn from_phrase(phrase: &PairingPhrase) -> Self {
        let seed = derive_key(SESSION_KEY_CONTEXT, &phrase.entropy());
        Self {
            keypair: KeyPair::from_seed(&seed),
        }
    }

    /// Rebuild keys from persisted session state.
    pub fn from_state(state: &SessionState) -> Result<Self, SessionError> {
        let seed = hex::decode(&state.local_static_seed)
            .map_err(|e| SessionError::Store(format!("corrupt session seed: {}", e)))?;
        let keypair = KeyPair::from_bytes(&seed)
            .map_err(|e| SessionError::Store(format!("corrupt session seed: {}", e)))?;
        Ok(Self { keypair })
    }

    /// The session's public identity.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    fn to_state(&self) -> SessionState {
        SessionState {
            local_static_seed: hex::encode(self.keypair.secret_bytes()),
            remote_static_key: None,
            expiry: None,
        }
    }
}

/// Per-call authorization derived from the session: a signed timestamp and
/// nonce the remote peer verifies against the session's public key.
#[derive(Debug, Clone)]
pub struct CallAuth {
    /// Unix timestamp (seconds) at signing time.
    pub timestamp: i64,
    /// Random per-call nonce.
    pub nonce: [u8; 16],
    /// Signature over timestamp ‖ nonce.
    pub signature: Signature,
}

impl CallAuth {
    fn signing_payload(timestamp: i64, nonce: &[u8; 16]) -> Vec<u8> {
        let mut payload = Vec::with_capacity(24);
        payload.extend_from_slice(&timestamp.to_be_bytes());
        payload.extend_from_slice(nonce);
        payload
    }

    /// Verify this authorization against a session public key.
    pub fn verify(&self, pubkey: &PublicKey) -> Result<(), SessionError> {
        let payload = Self::signing_payload(self.timestamp, &self.nonce);
        verify(&payload, &self.signature, pubkey)
            .map_err(|_| SessionError::Rejected("invalid call authorization".into()))
    }
}

/// A backend reached through an established session tunnel. Every call
/// carries the per-call authorization produced by the transport.
#[async_trait]
pub trait TunneledBackend: Send + Sync {
    async fn create_invoice(
        &self,
        auth: &CallAuth,
        amount: Price,
        memo: &str,
    ) -> Result<(PaymentHash, String), SettlementError>;

    async fn lookup_invoice(
        &self,
        auth: &CallAuth,
        hash: PaymentHash,
    ) -> Result<Invoice, SettlementError>;

    async fn ping(&self, auth: &CallAuth) -> Result<(), SettlementError>;
}

/// Establishes the tunnel to the remote settlement backend. The mailbox /
/// relay mechanics live behind this seam so the transport logic stays
/// testable in-process.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn dial(&self, keys: &SessionKeys) -> Result<Arc<dyn TunneledBackend>, SessionError>;
}

struct SessionShared {
    keypair: KeyPair,
    connected: AtomicBool,
}

impl SessionShared {
    fn call_auth(&self) -> Result<CallAuth, SessionError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(SessionError::NotConnected);
        }
        let timestamp = Utc::now().timestamp();
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);
        let payload = CallAuth::signing_payload(timestamp, &nonce);
        Ok(CallAuth {
            timestamp,
            nonce,
            signature: sign(&payload, &self.keypair),
        })
    }
}

/// A secure, authenticated channel to a remote settlement backend,
/// established from a pairing credential instead of a direct socket.
///
/// The transport exclusively owns its connection; a credential must not be
/// shared across concurrently connected transports.
pub struct SessionTransport {
    shared: Arc<SessionShared>,
    tunnel: Arc<dyn TunneledBackend>,
}

impl SessionTransport {
    /// Connect: resume persisted session state if the store has one (and it
    /// has not expired), otherwise derive fresh keys from the pairing
    /// phrase; dial the tunnel; persist the refreshed state.
    pub async fn connect(
        phrase: &PairingPhrase,
        store: &dyn SessionStore,
        connector: &dyn SessionConnector,
    ) -> Result<Self, SessionError> {
        let keys = match store.load()? {
            Some(state) if !Self::state_expired(&state) => {
                tracing::debug!("resuming persisted session state");
                SessionKeys::from_state(&state)?
            }
            Some(_) => {
                tracing::info!("persisted session expired, re-deriving from pairing phrase");
                SessionKeys::from_phrase(phrase)
            }
            None => SessionKeys::from_phrase(phrase),
        };

        let tunnel = connector.dial(&keys).await?;
        store.save(&keys.to_state())?;

        tracing::info!(session_key = %keys.public_key().to_hex(), "session transport connected");

        Ok(Self {
            shared: Arc::new(SessionShared {
                keypair: keys.keypair,
                connected: AtomicBool::new(true),
            }),
            tunnel,
        })
    }

    fn state_expired(state: &SessionState) -> bool {
        state.expiry.map(|t| t <= Utc::now()).unwrap_or(false)
    }

    /// Per-call authorization for the next delegated call. Fails with
    /// `NotConnected` once the transport is disconnected.
    pub fn call_auth(&self) -> Result<CallAuth, SessionError> {
        self.shared.call_auth()
    }

    /// Whether the transport is currently connected.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// A settlement client that routes through this transport, refreshing
    /// per-call authorization on every call.
    pub fn client(&self) -> Result<Arc<dyn SettlementBackend>, SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        Ok(Arc::new(SessionClient {
            shared: Arc::clone(&self.shared),
            tunnel: Arc::clone(&self.tunnel),
        }))
    }

    /// Tear down the transport. Idempotent: disconnecting an already
    /// disconnected transport is a no-op.
    pub fn disconnect(&self) -> Result<(), SessionError> {
        let was_connected = self.shared.connected.swap(false, Ordering::SeqCst);
        if was_connected {
            tracing::info!("session transport disconnected");
        } else {
            tracing::debug!("session transport already disconnected");
        }
        Ok(())
    }
}

/// Client handle over a session tunnel. Fails closed with `NotConnected`
/// once the transport is torn down, so in-flight callers never observe a
/// dead tunnel as a hang.
struct SessionClient {
    shared: Arc<SessionShared>,
    tunnel: Arc<dyn TunneledBackend>,
}

impl SessionClient {
    fn auth(&self) -> Result<CallAuth, SettlementError> {
        self.shared.call_auth().map_err(|_| SettlementError::NotConnected)
    }
}

#[async_trait]
impl SettlementBackend for SessionClient {
    async fn create_invoice(
        &self,
        amount: Price,
        memo: &str,
    ) -> Result<(PaymentHash, String), SettlementError> {
        let auth = self.auth()?;
        self.tunnel.create_invoice(&auth, amount, memo).await
    }

    async fn lookup_invoice(&self, hash: PaymentHash) -> Result<Invoice, SettlementError> {
        let auth = self.auth()?;
        self.tunnel.lookup_invoice(&auth, hash).await
    }

    async fn ping(&self) -> Result<(), SettlementError> {
        let auth = self.auth()?;
        self.tunnel.ping(&auth).await
    }
}

/// Accessor over a session transport: yields a client only while the
/// transport is connected.
pub struct SessionAccessor {
    transport: Arc<SessionTransport>,
}

impl SessionAccessor {
    pub fn new(transport: Arc<SessionTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ClientAccessor for SessionAccessor {
    async fn client(&self) -> Result<Arc<dyn SettlementBackend>, SettlementError> {
        self.transport.client().map_err(|_| SettlementError::NotConnected)
    }
}

/// Connector over an already reachable backend handle: the tunnel stand-in
/// verifies each call's authorization against the session key and
/// delegates. Used by tests and by setups that terminate the tunnel
/// elsewhere.
pub struct StaticConnector {
    backend: Arc<dyn SettlementBackend>,
    fail_dial: AtomicBool,
    authed_calls: Arc<AtomicU64>,
}

impl StaticConnector {
    pub fn new(backend: Arc<dyn SettlementBackend>) -> Self {
        Self {
            backend,
            fail_dial: AtomicBool::new(false),
            authed_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Make the next dial fail, for handshake-failure tests.
    pub fn set_fail_dial(&self, fail: bool) {
        self.fail_dial.store(fail, Ordering::SeqCst);
    }

    /// Number of tunneled calls that carried valid authorization.
    pub fn authed_calls(&self) -> u64 {
        self.authed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionConnector for StaticConnector {
    async fn dial(&self, keys: &SessionKeys) -> Result<Arc<dyn TunneledBackend>, SessionError> {
        if self.fail_dial.load(Ordering::SeqCst) {
            return Err(SessionError::Handshake("tunnel dial refused".into()));
        }
        Ok(Arc::new(StaticTunnel {
            backend: Arc::clone(&self.backend),
            session_key: keys.public_key(),
            authed_calls: Arc::clone(&self.authed_calls),
        }))
    }
}

struct StaticTunnel {
    backend: Arc<dyn SettlementBackend>,
    session_key: PublicKey,
    authed_calls: Arc<AtomicU64>,
}

impl StaticTunnel {
    fn check_auth(&self, auth: &CallAuth) -> Result<(), SettlementError> {
        auth.verify(&self.session_key)
            .map_err(|e| SettlementError::Rejected(e.to_string()))?;
        self.authed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl TunneledBackend for StaticTunnel {
    async fn create_invoice(
        &self,
        auth: &CallAuth,
        amount: Price,
        memo: &str,
    ) -> Result<(PaymentHash, String), SettlementError> {
        self.check_auth(auth)?;
        self.backend.create_invoice(amount, memo).await
    }

    async fn lookup_invoice(
        &self,
        auth: &CallAuth,
        hash: PaymentHash,
    ) -> Result<Invoice, SettlementError> {
        self.check_auth(auth)?;
        self.backend.lookup_invoice(hash).await
    }

    async fn ping(&self, auth: &CallAuth) -> Result<(), SettlementError> {
        self.check_auth(auth)?;
        self.backend.ping().await
    }
}
