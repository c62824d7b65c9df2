pub mod encryption;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use encryption::{decrypt, encrypt, x25519_public_key, EncryptedPayload};
pub use error::CryptoError;
pub use hashing::{derive_key, hash};
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, verify, Signature};
