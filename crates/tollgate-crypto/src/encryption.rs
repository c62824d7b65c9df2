use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::error::CryptoError;
use crate::keys::KeyPair;

/// Encrypted payload: ciphertext plus the material the recipient needs to
/// decrypt it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Ephemeral X25519 public key used for the key exchange.
    pub ephemeral_pubkey: [u8; 32],
    /// 12-byte ChaCha20-Poly1305 nonce.
    pub nonce: [u8; 12],
    /// Ciphertext including the 16-byte Poly1305 tag.
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Serialize: ephemeral pubkey (32) ‖ nonce (12) ‖ ciphertext.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(44 + self.ciphertext.len());
        out.extend_from_slice(&self.ephemeral_pubkey);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Deserialize from the framing produced by `to_bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < 44 {
            return Err(CryptoError::DecryptionError("payload too short".into()));
        }
        let mut ephemeral_pubkey = [0u8; 32];
        ephemeral_pubkey.copy_from_slice(&bytes[..32]);
        let mut nonce = [0u8; 12];
        nonce.copy_from_slice(&bytes[32..44]);
        Ok(Self {
            ephemeral_pubkey,
            nonce,
            ciphertext: bytes[44..].to_vec(),
        })
    }
}

/// Derive the X25519 static secret for a signing key pair, with BLAKE3
/// domain separation so the two key families stay unrelated.
fn derive_x25519_secret(keypair: &KeyPair) -> StaticSecret {
    let seed = keypair.secret_bytes();
    let derived = blake3::derive_key("tollgate-x25519-key-derivation-v1", &seed);
    StaticSecret::from(derived)
}

/// The X25519 public key a recipient publishes to receive encrypted
/// receipts.
pub fn x25519_public_key(keypair: &KeyPair) -> [u8; 32] {
    let secret = derive_x25519_secret(keypair);
    X25519PublicKey::from(&secret).to_bytes()
}

/// Encrypt plaintext to a recipient's X25519 public key.
///
/// A fresh ephemeral key pair performs Diffie-Hellman with the recipient
/// key; the shared secret keys ChaCha20-Poly1305.
pub fn encrypt(
    plaintext: &[u8],
    recipient_x25519_pubkey: &[u8; 32],
) -> Result<EncryptedPayload, CryptoError> {
    let mut ephemeral_secret_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut ephemeral_secret_bytes);
    let ephemeral_secret = StaticSecret::from(ephemeral_secret_bytes);
    let ephemeral_pubkey = X25519PublicKey::from(&ephemeral_secret);

    let shared = ephemeral_secret.diffie_hellman(&X25519PublicKey::from(*recipient_x25519_pubkey));

    let cipher = ChaCha20Poly1305::new_from_slice(shared.as_bytes())
        .map_err(|e| CryptoError::EncryptionError(e.to_string()))?;

    let mut nonce = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionError(e.to_string()))?;

    Ok(EncryptedPayload {
        ephemeral_pubkey: ephemeral_pubkey.to_bytes(),
        nonce,
        ciphertext,
    })
}

/// Decrypt a payload encrypted to this key pair's X25519 key.
pub fn decrypt(payload: &EncryptedPayload, keypair: &KeyPair) -> Result<Vec<u8>, CryptoError> {
    let secret = derive_x25519_secret(keypair);
    let shared = secret.diffie_hellman(&X25519PublicKey::from(payload.ephemeral_pubkey));

    let cipher = ChaCha20Poly1305::new_from_slice(shared.as_bytes())
        .map_err(|e| CryptoError::DecryptionError(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(&payload.nonce), payload.ciphertext.as_ref())
        .map_err(|_| CryptoError::DecryptionError("authentication failed".into()))
}
