//! Shared helpers for the cross-crate integration tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use tollgate_challenger::{
    default_invoice_request, Challenger, ChallengerConfig, ChallengerError, DirectChallenger,
};
use tollgate_core::{Price, Service};
use tollgate_crypto::KeyPair;
use tollgate_mint::Minter;
use tollgate_settlement::{DirectAccessor, MockBackend, SettlementBackend};

/// Pairing phrase used by the session-variant tests.
pub const TEST_PHRASE: &str =
    "anchor bridge copper drift ember forest glacier harbor island juniper";

/// Tight intervals so tests settle and time out in milliseconds.
pub fn fast_config() -> ChallengerConfig {
    ChallengerConfig {
        poll_interval: Duration::from_millis(10),
        monitor_interval: Duration::from_millis(50),
        stop_grace: Duration::from_millis(500),
    }
}

/// A mock backend plus a started direct challenger over it.
pub async fn direct_challenger() -> (Arc<MockBackend>, Arc<DirectChallenger>) {
    let backend = Arc::new(MockBackend::new());
    let accessor = Arc::new(DirectAccessor::new(
        Arc::clone(&backend) as Arc<dyn SettlementBackend>
    ));
    let (err_tx, _err_rx) = mpsc::channel::<ChallengerError>(1);

    let challenger = Arc::new(DirectChallenger::new(
        accessor,
        default_invoice_request(),
        err_tx,
        fast_config(),
    ));
    challenger
        .start()
        .await
        .expect("challenger should start against a live backend");
    (backend, challenger)
}

/// A minter over the given challenger, authorized for `blog` and `api`,
/// issuing tokens valid for an hour.
pub fn minter_for(challenger: Arc<dyn Challenger>) -> Minter {
    let authorized: HashSet<String> = ["blog", "api"].iter().map(|s| s.to_string()).collect();
    Minter::new(
        challenger,
        KeyPair::generate(),
        authorized,
        chrono::Duration::hours(1),
    )
}

/// The service catalog entry most tests purchase.
pub fn blog_service() -> Vec<Service> {
    vec![Service::new("blog", Price::new(1000))]
}
