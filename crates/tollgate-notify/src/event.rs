use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tollgate_crypto::{hash, sign, verify, KeyPair, PublicKey, Signature};

use crate::error::NotifyError;

/// A signed receipt event addressed to one recipient.
///
/// The content is encrypted to the recipient; the envelope (author, tags,
/// timestamps) is public so relays can route it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptEvent {
    /// Event id: hash of the canonical envelope, hex.
    pub id: String,
    /// Hex-encoded public key of the publishing service.
    pub author_pubkey: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Routing tags: recipient, protocol label, service label, relays.
    pub tags: Vec<Vec<String>>,
    /// Base64-encoded encrypted receipt.
    pub content: String,
    /// Hex-encoded signature over the event id.
    pub signature: String,
}

impl ReceiptEvent {
    /// Assemble, id, and sign an event.
    pub fn build(
        keypair: &KeyPair,
        created_at: DateTime<Utc>,
        tags: Vec<Vec<String>>,
        content: String,
    ) -> Result<Self, NotifyError> {
        let author_pubkey = keypair.public_key().to_hex();
        let id = Self::compute_id(&author_pubkey, created_at, &tags, &content)?;
        let signature = sign(id.as_bytes(), keypair).to_hex();

        Ok(Self {
            id,
            author_pubkey,
            created_at,
            tags,
            content,
            signature,
        })
    }

    fn compute_id(
        author_pubkey: &str,
        created_at: DateTime<Utc>,
        tags: &[Vec<String>],
        content: &str,
    ) -> Result<String, NotifyError> {
        let canonical = serde_json::to_vec(&(author_pubkey, created_at.timestamp(), tags, content))
            .map_err(|e| NotifyError::Encryption(e.to_string()))?;
        Ok(hex::encode(hash(&canonical)))
    }

    /// Verify the event id and signature against the author's key.
    pub fn verify(&self, author: &PublicKey) -> Result<(), NotifyError> {
        let expected =
            Self::compute_id(&self.author_pubkey, self.created_at, &self.tags, &self.content)?;
        if expected != self.id {
            return Err(NotifyError::Relay("event id mismatch".into()));
        }
        let signature = Signature::from_hex(&self.signature)
            .map_err(|e| NotifyError::Relay(e.to_string()))?;
        verify(self.id.as_bytes(), &signature, author)
            .map_err(|_| NotifyError::Relay("event signature mismatch".into()))
    }

    /// The recipient's key from the routing tags, if present.
    pub fn recipient(&self) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.first().map(String::as_str) == Some("p"))
            .and_then(|tag| tag.get(1))
            .map(String::as_str)
    }
}
