use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tollgate_core::{InvoiceState, PaymentHash, Preimage, Price};

use crate::error::SettlementError;
use crate::traits::SettlementBackend;
use crate::types::Invoice;

/// In-memory settlement backend.
///
/// Stands in for a real node in tests: invoices live in a DashMap, test
/// hooks drive settlement, and failure injection covers the offline and
/// transient-lookup-error paths the challenger must tolerate.
pub struct MockBackend {
    invoices: DashMap<PaymentHash, Invoice>,
    offline: AtomicBool,
    failing_lookups: AtomicU64,
    lookup_count: AtomicU64,
    create_count: AtomicU64,
}

impl MockBackend {
    /// Create an empty mock backend.
    pub fn new() -> Self {
        Self {
            invoices: DashMap::new(),
            offline: AtomicBool::new(false),
            failing_lookups: AtomicU64::new(0),
            lookup_count: AtomicU64::new(0),
            create_count: AtomicU64::new(0),
        }
    }

    /// Mark the invoice as settled, revealing its preimage.
    ///
    /// Only open or pending invoices settle; terminal states never regress.
    pub fn settle(&self, hash: PaymentHash) -> Result<(), SettlementError> {
        let mut entry = self
            .invoices
            .get_mut(&hash)
            .ok_or(SettlementError::InvoiceNotFound(hash))?;
        let invoice = entry.value_mut();

        match invoice.state {
            InvoiceState::Open | InvoiceState::Pending => {
                invoice.state = InvoiceState::Settled;
                invoice.settled_at = Some(Utc::now());
                invoice.amount_paid_msat = invoice.amount.msats();
                tracing::info!(hash = %hash, "mock invoice settled");
                Ok(())
            }
            InvoiceState::Settled => Ok(()),
            InvoiceState::Canceled => Err(SettlementError::Rejected(
                "cannot settle a canceled invoice".into(),
            )),
        }
    }

    /// Mark the invoice as canceled.
    pub fn cancel(&self, hash: PaymentHash) -> Result<(), SettlementError> {
        let mut entry = self
            .invoices
            .get_mut(&hash)
            .ok_or(SettlementError::InvoiceNotFound(hash))?;
        let invoice = entry.value_mut();

        match invoice.state {
            InvoiceState::Settled => Err(SettlementError::Rejected(
                "cannot cancel a settled invoice".into(),
            )),
            _ => {
                invoice.state = InvoiceState::Canceled;
                tracing::info!(hash = %hash, "mock invoice canceled");
                Ok(())
            }
        }
    }

    /// Mark a payment as in flight.
    pub fn mark_pending(&self, hash: PaymentHash) -> Result<(), SettlementError> {
        let mut entry = self
            .invoices
            .get_mut(&hash)
            .ok_or(SettlementError::InvoiceNotFound(hash))?;
        let invoice = entry.value_mut();
        if invoice.state == InvoiceState::Open {
            invoice.state = InvoiceState::Pending;
        }
        Ok(())
    }

    /// Take the backend offline (ping and all calls fail) or back online.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail the next `n` lookups with a transient error, then recover.
    pub fn fail_next_lookups(&self, n: u64) {
        self.failing_lookups.store(n, Ordering::SeqCst);
    }

    /// Number of lookups served (including injected failures).
    pub fn lookup_count(&self) -> u64 {
        self.lookup_count.load(Ordering::SeqCst)
    }

    /// Number of invoices created.
    pub fn create_count(&self) -> u64 {
        self.create_count.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), SettlementError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SettlementError::BackendDown("backend offline".into()));
        }
        Ok(())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettlementBackend for MockBackend {
    async fn create_invoice(
        &self,
        amount: Price,
        memo: &str,
    ) -> Result<(PaymentHash, String), SettlementError> {
        self.check_online()?;
        if !amount.is_valid() {
            return Err(SettlementError::InvalidAmount(amount.sats()));
        }

        let preimage = Preimage::random();
        let hash = preimage.payment_hash();
        let payment_request = format!("mock1{}{}", amount.sats(), hash);

        let invoice = Invoice {
            payment_hash: hash,
            preimage: Some(preimage),
            amount,
            memo: memo.to_string(),
            payment_request: payment_request.clone(),
            state: InvoiceState::Open,
            created_at: Utc::now(),
            settled_at: None,
            amount_paid_msat: 0,
        };
        self.invoices.insert(hash, invoice);
        self.create_count.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(hash = %hash, amount = %amount, "mock invoice created");
        Ok((hash, payment_request))
    }

    async fn lookup_invoice(&self, hash: PaymentHash) -> Result<Invoice, SettlementError> {
        self.lookup_count.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        if self.failing_lookups.load(Ordering::SeqCst) > 0 {
            self.failing_lookups.fetch_sub(1, Ordering::SeqCst);
            return Err(SettlementError::BackendDown("injected lookup failure".into()));
        }

        self.invoices
            .get(&hash)
            .map(|entry| {
                let mut invoice = entry.value().clone();
                // The preimage only leaves the backend once settled.
                if invoice.state != InvoiceState::Settled {
                    invoice.preimage = None;
                }
                invoice
            })
            .ok_or(SettlementError::InvoiceNotFound(hash))
    }

    async fn ping(&self) -> Result<(), SettlementError> {
        self.check_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_invoice_unique_hashes() {
        let backend = MockBackend::new();
        let (h1, req1) = backend.create_invoice(Price::new(1000), "a").await.unwrap();
        let (h2, req2) = backend.create_invoice(Price::new(1000), "a").await.unwrap();
        assert_ne!(h1, h2);
        assert_ne!(req1, req2);
        assert_eq!(backend.create_count(), 2);
    }

    #[tokio::test]
    async fn test_create_invoice_rejects_bad_amount() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.create_invoice(Price::new(0), "memo").await,
            Err(SettlementError::InvalidAmount(0))
        ));
        assert!(matches!(
            backend.create_invoice(Price::new(-1), "memo").await,
            Err(SettlementError::InvalidAmount(-1))
        ));
    }

    #[tokio::test]
    async fn test_settle_reveals_preimage() {
        let backend = MockBackend::new();
        let (hash, _) = backend.create_invoice(Price::new(1000), "memo").await.unwrap();

        let before = backend.lookup_invoice(hash).await.unwrap();
        assert!(before.preimage.is_none());
        assert_eq!(before.state, InvoiceState::Open);

        backend.settle(hash).unwrap();
        let after = backend.lookup_invoice(hash).await.unwrap();
        assert_eq!(after.state, InvoiceState::Settled);
        assert_eq!(after.amount_paid_msat, 1_000_000);
        let preimage = after.preimage.expect("preimage revealed after settle");
        assert_eq!(preimage.payment_hash(), hash);
    }

    #[tokio::test]
    async fn test_settled_never_regresses() {
        let backend = MockBackend::new();
        let (hash, _) = backend.create_invoice(Price::new(1000), "memo").await.unwrap();
        backend.settle(hash).unwrap();

        assert!(backend.cancel(hash).is_err());
        assert!(backend.settle(hash).is_ok());
        let invoice = backend.lookup_invoice(hash).await.unwrap();
        assert_eq!(invoice.state, InvoiceState::Settled);
    }

    #[tokio::test]
    async fn test_cancel_blocks_settle() {
        let backend = MockBackend::new();
        let (hash, _) = backend.create_invoice(Price::new(1000), "memo").await.unwrap();
        backend.cancel(hash).unwrap();
        assert!(backend.settle(hash).is_err());
    }

    #[tokio::test]
    async fn test_offline_fails_everything() {
        let backend = MockBackend::new();
        let (hash, _) = backend.create_invoice(Price::new(1000), "memo").await.unwrap();

        backend.set_offline(true);
        assert!(backend.ping().await.is_err());
        assert!(backend.lookup_invoice(hash).await.is_err());
        assert!(backend.create_invoice(Price::new(1000), "memo").await.is_err());

        backend.set_offline(false);
        assert!(backend.ping().await.is_ok());
        assert!(backend.lookup_invoice(hash).await.is_ok());
    }

    #[tokio::test]
    async fn test_transient_lookup_failures_recover() {
        let backend = MockBackend::new();
        let (hash, _) = backend.create_invoice(Price::new(1000), "memo").await.unwrap();

        backend.fail_next_lookups(2);
        assert!(backend.lookup_invoice(hash).await.is_err());
        assert!(backend.lookup_invoice(hash).await.is_err());
        assert!(backend.lookup_invoice(hash).await.is_ok());
        assert_eq!(backend.lookup_count(), 3);
    }

    #[tokio::test]
    async fn test_lookup_unknown_hash() {
        let backend = MockBackend::new();
        let hash = Preimage::random().payment_hash();
        assert!(matches!(
            backend.lookup_invoice(hash).await,
            Err(SettlementError::InvoiceNotFound(_))
        ));
    }
}
