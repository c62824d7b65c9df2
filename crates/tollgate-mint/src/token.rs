use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tollgate_core::{PaymentHash, Service};
use tollgate_crypto::{sign, verify, KeyPair, PublicKey, Signature};

use crate::error::MintError;

/// A signed capability statement bound to a payment challenge.
///
/// Never mutated after minting; it becomes exercisable once the referenced
/// payment settles, and lapses when its validity window does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Token identifier (UUID v7, time-ordered).
    pub id: Uuid,
    /// The purchased service set.
    pub services: Vec<Service>,
    /// The payment challenge that must be satisfied to exercise the token.
    pub payment_hash: PaymentHash,
    /// When the token was minted.
    pub issued_at: DateTime<Utc>,
    /// When the token lapses.
    pub expires_at: DateTime<Utc>,
    /// Hex-encoded Ed25519 signature over the canonical payload.
    pub signature: String,
}

/// The canonical view that gets signed; field order is the wire contract.
#[derive(Serialize)]
struct SigningView<'a> {
    id: &'a Uuid,
    services: &'a [Service],
    payment_hash: &'a PaymentHash,
    issued_at: &'a DateTime<Utc>,
    expires_at: &'a DateTime<Utc>,
}

impl Token {
    /// Mint and sign a new token.
    pub fn mint(
        services: Vec<Service>,
        payment_hash: PaymentHash,
        validity: chrono::Duration,
        keypair: &KeyPair,
    ) -> Result<Self, MintError> {
        let issued_at = Utc::now();
        let mut token = Self {
            id: Uuid::now_v7(),
            services,
            payment_hash,
            issued_at,
            expires_at: issued_at + validity,
            signature: String::new(),
        };

        let payload = token.signing_payload()?;
        token.signature = sign(&payload, keypair).to_hex();
        Ok(token)
    }

    /// The canonical bytes covered by the signature.
    pub fn signing_payload(&self) -> Result<Vec<u8>, MintError> {
        serde_json::to_vec(&SigningView {
            id: &self.id,
            services: &self.services,
            payment_hash: &self.payment_hash,
            issued_at: &self.issued_at,
            expires_at: &self.expires_at,
        })
        .map_err(|e| MintError::Signing(e.to_string()))
    }

    /// Check the token's signature against the minter's public key.
    pub fn verify_signature(&self, pubkey: &PublicKey) -> Result<(), MintError> {
        let signature = Signature::from_hex(&self.signature)
            .map_err(|e| MintError::Unauthorized(format!("malformed signature: {}", e)))?;
        let payload = self.signing_payload()?;
        verify(&payload, &signature, pubkey)
            .map_err(|_| MintError::Unauthorized("signature mismatch".into()))
    }

    /// Whether the validity window has lapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Encode for transport: base64 over the JSON form.
    pub fn encode(&self) -> Result<String, MintError> {
        let json = serde_json::to_vec(self).map_err(|e| MintError::Encoding(e.to_string()))?;
        Ok(BASE64.encode(json))
    }

    /// Decode a token previously produced by `encode`.
    pub fn decode(encoded: &str) -> Result<Self, MintError> {
        let json = BASE64
            .decode(encoded)
            .map_err(|e| MintError::Encoding(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| MintError::Encoding(e.to_string()))
    }
}
