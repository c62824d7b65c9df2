//! Tollgate session transport
//!
//! Reaches a settlement backend that is not directly connectable: a
//! pairing credential is turned into session keys, a pluggable connector
//! dials the tunnel, and every call through the resulting client carries
//! per-call authorization derived from the session.

pub mod credential;
pub mod error;
pub mod store;
pub mod transport;

pub use credential::PairingPhrase;
pub use error::SessionError;
pub use store::{MemoryStore, SessionState, SessionStore};
pub use transport::{
    CallAuth, SessionAccessor, SessionConnector, SessionKeys, SessionTransport, StaticConnector,
    TunneledBackend,
};
