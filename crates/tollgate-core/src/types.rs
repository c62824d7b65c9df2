use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Price in satoshis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(pub i64);

impl Price {
    /// Create a new price.
    pub fn new(sats: i64) -> Self {
        Self(sats)
    }

    /// The price in satoshis.
    pub fn sats(&self) -> i64 {
        self.0
    }

    /// The price in millisatoshis.
    pub fn msats(&self) -> i64 {
        self.0 * 1000
    }

    /// Whether this price is valid for an invoice (strictly positive).
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat", self.0)
    }
}

/// Pricing tier of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceTier {
    /// Regular paid service.
    Base,
    /// Free service; contributes nothing to the aggregate price.
    Freebie,
}

/// A named capability being purchased. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// The service name, e.g. "blog".
    pub name: String,
    /// The pricing tier.
    pub tier: ServiceTier,
    /// The price of the service.
    pub price: Price,
}

impl Service {
    /// Create a new base-tier service.
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            tier: ServiceTier::Base,
            price,
        }
    }

    /// Create a new freebie service.
    pub fn freebie(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tier: ServiceTier::Freebie,
            price: Price(0),
        }
    }
}

/// Aggregate the price of a service set.
///
/// Freebie services contribute nothing. Fails on an empty set and on any
/// base-tier service with a non-positive price.
pub fn total_price(services: &[Service]) -> Result<Price, CoreError> {
    if services.is_empty() {
        return Err(CoreError::NoServices);
    }

    let mut total = 0i64;
    for service in services {
        match service.tier {
            ServiceTier::Freebie => continue,
            ServiceTier::Base => {
                if !service.price.is_valid() {
                    return Err(CoreError::InvalidPrice {
                        service: service.name.clone(),
                        price: service.price.sats(),
                    });
                }
                total += service.price.sats();
            }
        }
    }

    Ok(Price(total))
}

/// The secret whose hash is a payment identifier (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preimage(pub [u8; 32]);

impl Preimage {
    /// Generate a random preimage.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidPreimage(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// The payment hash committing to this preimage.
    pub fn payment_hash(&self) -> PaymentHash {
        PaymentHash(*blake3::hash(&self.0).as_bytes())
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Preimage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret itself.
        write!(f, "Preimage(..)")
    }
}

/// Unique payment identifier (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentHash(pub [u8; 32]);

impl PaymentHash {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidHash(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// Decode from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidHash(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PaymentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
