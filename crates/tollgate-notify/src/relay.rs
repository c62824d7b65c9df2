use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::NotifyError;
use crate::event::ReceiptEvent;

/// A message relay receipts are published to.
#[async_trait]
pub trait Relay: Send + Sync {
    /// The relay's address, used in logs and outcomes.
    fn url(&self) -> &str;

    /// Deliver one event.
    async fn publish(&self, event: &ReceiptEvent) -> Result<(), NotifyError>;
}

/// In-memory relay for tests: records published events, optionally fails.
pub struct MemoryRelay {
    url: String,
    events: Mutex<Vec<ReceiptEvent>>,
    failing: AtomicBool,
}

impl MemoryRelay {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            events: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make subsequent publishes fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Events delivered so far.
    pub fn events(&self) -> Vec<ReceiptEvent> {
        self.events.lock().expect("relay lock poisoned").clone()
    }
}

#[async_trait]
impl Relay for MemoryRelay {
    fn url(&self) -> &str {
        &self.url
    }

    async fn publish(&self, event: &ReceiptEvent) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Relay(format!("{} refused event", self.url)));
        }
        self.events
            .lock()
            .expect("relay lock poisoned")
            .push(event.clone());
        Ok(())
    }
}
