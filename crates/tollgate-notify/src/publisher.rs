use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use std::sync::Arc;

use tollgate_core::Price;
use tollgate_crypto::{encrypt, KeyPair};
use tollgate_settlement::Invoice;

use crate::error::NotifyError;
use crate::event::ReceiptEvent;
use crate::relay::Relay;

/// A structured settlement receipt to deliver.
#[derive(Debug, Clone)]
pub struct ReceiptParams {
    /// Hex-encoded X25519 public key of the recipient.
    pub recipient_pubkey: String,
    /// Relays the recipient reads, if known.
    pub recipient_relays: Vec<String>,
    /// Identifier of the purchased content, e.g. an article slug.
    pub slug: String,
    /// The quoted price.
    pub price: Price,
    /// The settled invoice backing the receipt.
    pub invoice: Invoice,
}

/// Per-relay delivery result.
#[derive(Debug)]
pub struct RelayOutcome {
    pub url: String,
    pub result: Result<(), NotifyError>,
}

/// Publishes encrypted settlement receipts, best-effort, to a relay set.
pub struct ReceiptPublisher {
    keypair: KeyPair,
    service_name: String,
    relays: Vec<Arc<dyn Relay>>,
}

impl ReceiptPublisher {
    /// Create a publisher identified by the service keypair.
    pub fn new(keypair: KeyPair, service_name: impl Into<String>, relays: Vec<Arc<dyn Relay>>) -> Self {
        Self {
            keypair,
            service_name: service_name.into(),
            relays,
        }
    }

    /// Render, encrypt, sign, and deliver a receipt to every configured
    /// relay. Per-relay failures are isolated: each failure is logged and
    /// recorded in its outcome, and delivery continues to the remaining
    /// relays.
    pub async fn publish_receipt(
        &self,
        params: &ReceiptParams,
    ) -> Result<Vec<RelayOutcome>, NotifyError> {
        let event = self.build_event(params)?;

        let mut outcomes = Vec::with_capacity(self.relays.len());
        // TODO: also publish to the recipient's relay list.
        for relay in &self.relays {
            let result = relay.publish(&event).await;
            match &result {
                Ok(()) => {
                    tracing::info!(relay = relay.url(), event = %event.id, "receipt published")
                }
                Err(e) => {
                    tracing::warn!(relay = relay.url(), error = %e, "receipt delivery failed")
                }
            }
            outcomes.push(RelayOutcome {
                url: relay.url().to_string(),
                result,
            });
        }
        Ok(outcomes)
    }

    fn build_event(&self, params: &ReceiptParams) -> Result<ReceiptEvent, NotifyError> {
        let invoice = &params.invoice;
        if !invoice.is_settled() {
            return Err(NotifyError::NotSettled);
        }
        let preimage = invoice.preimage.as_ref().ok_or(NotifyError::MissingPreimage)?;
        let settled_at = invoice.settled_at.ok_or(NotifyError::NotSettled)?;

        // The plaintext is the recipient's human-readable proof of payment.
        let plaintext = format!(
            "{} slug={} settle_date={} price={} paid_amount={} preimage={} payment_hash={}",
            self.service_name,
            params.slug,
            settled_at.format("%Y-%m-%dT%H:%M:%S"),
            params.price.msats(),
            invoice.amount_paid_msat,
            preimage.to_hex(),
            invoice.payment_hash,
        );

        let recipient_key = decode_recipient_key(&params.recipient_pubkey)?;
        let encrypted = encrypt(plaintext.as_bytes(), &recipient_key)
            .map_err(|e| NotifyError::Encryption(e.to_string()))?;
        let content = BASE64.encode(encrypted.to_bytes());

        let mut tags = vec![
            vec!["p".to_string(), params.recipient_pubkey.clone()],
            vec!["L".to_string(), "#tollgate".to_string()],
            vec![
                "l".to_string(),
                self.service_name.clone(),
                "#tollgate".to_string(),
            ],
        ];
        let mut relay_tag = vec!["relays".to_string()];
        relay_tag.extend(self.relays.iter().map(|r| r.url().to_string()));
        tags.push(relay_tag);

        ReceiptEvent::build(&self.keypair, Utc::now(), tags, content)
    }
}

fn decode_recipient_key(hex_key: &str) -> Result<[u8; 32], NotifyError> {
    let bytes = hex::decode(hex_key).map_err(|e| NotifyError::InvalidRecipient(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| NotifyError::InvalidRecipient("key must be 32 bytes".into()))
}
