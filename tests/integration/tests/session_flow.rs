//! Integration test: minting over a session-tunneled backend.
//!
//! The session variant must behave exactly like the direct one while every
//! backend call carries fresh per-call authorization.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use tollgate_challenger::{
    default_invoice_request, Challenger, ChallengerError, SessionChallenger,
};
use tollgate_integration_tests::{blog_service, fast_config, minter_for, TEST_PHRASE};
use tollgate_mint::{MintError, VerificationParams};
use tollgate_session::{MemoryStore, PairingPhrase, SessionStore, StaticConnector};
use tollgate_settlement::{MockBackend, SettlementBackend};

struct SessionRig {
    backend: Arc<MockBackend>,
    connector: StaticConnector,
    store: MemoryStore,
}

impl SessionRig {
    fn new() -> Self {
        let backend = Arc::new(MockBackend::new());
        let connector = StaticConnector::new(Arc::clone(&backend) as Arc<dyn SettlementBackend>);
        Self {
            backend,
            connector,
            store: MemoryStore::new(),
        }
    }

    async fn connect(&self) -> SessionChallenger {
        let (err_tx, _err_rx) = mpsc::channel(1);
        SessionChallenger::connect(
            &PairingPhrase::parse(TEST_PHRASE).expect("valid phrase"),
            &self.store,
            &self.connector,
            default_invoice_request(),
            err_tx,
            fast_config(),
        )
        .await
        .expect("session should connect")
    }
}

#[tokio::test]
async fn test_mint_pay_verify_over_session() {
    let rig = SessionRig::new();
    let challenger = Arc::new(rig.connect().await);
    let minter = minter_for(challenger.clone());

    let (token, payment_request) = minter.mint(&blog_service()).await.expect("mint");
    assert!(payment_request.starts_with("mock1"));

    rig.backend.settle(token.payment_hash).expect("settle");

    let payment_hash = token.payment_hash;
    minter
        .verify(&VerificationParams {
            token,
            payment_hash,
            settle_timeout: Duration::from_millis(100),
        })
        .await
        .expect("settled payment grants access through the tunnel");

    challenger.stop().await;
}

#[tokio::test]
async fn test_every_tunneled_call_is_authorized() {
    let rig = SessionRig::new();
    let challenger = rig.connect().await;

    // Startup alone pings through the tunnel.
    let after_connect = rig.connector.authed_calls();
    assert!(after_connect >= 1);

    let minter = minter_for(Arc::new(challenger));
    let (token, _) = minter.mint(&blog_service()).await.unwrap();
    let after_mint = rig.connector.authed_calls();
    assert!(after_mint > after_connect);

    rig.backend.settle(token.payment_hash).unwrap();
    let payment_hash = token.payment_hash;
    minter
        .verify(&VerificationParams {
            token,
            payment_hash,
            settle_timeout: Duration::from_millis(100),
        })
        .await
        .unwrap();
    assert!(rig.connector.authed_calls() > after_mint);
}

#[tokio::test]
async fn test_session_state_persists_and_resumes() {
    let rig = SessionRig::new();

    assert!(rig.store.load().unwrap().is_none());
    let first = rig.connect().await;
    let state = rig
        .store
        .load()
        .unwrap()
        .expect("connect should persist session state");
    first.stop().await;

    // A second connect resumes the stored session rather than re-deriving.
    let second = rig.connect().await;
    let resumed = rig.store.load().unwrap().expect("state still present");
    assert_eq!(resumed.local_static_seed, state.local_static_seed);

    let minter = minter_for(Arc::new(second));
    minter.mint(&blog_service()).await.expect("mint resumes");
}

#[tokio::test]
async fn test_dial_failure_surfaces_at_connect() {
    let rig = SessionRig::new();
    rig.connector.set_fail_dial(true);

    let (err_tx, _err_rx) = mpsc::channel(1);
    let result = SessionChallenger::connect(
        &PairingPhrase::parse(TEST_PHRASE).unwrap(),
        &rig.store,
        &rig.connector,
        default_invoice_request(),
        err_tx,
        fast_config(),
    )
    .await;
    assert!(matches!(result, Err(ChallengerError::Session(_))));
}

#[tokio::test]
async fn test_stopped_session_refuses_minting() {
    let rig = SessionRig::new();
    let challenger = Arc::new(rig.connect().await);
    let minter = minter_for(challenger.clone());

    challenger.stop().await;
    assert!(matches!(
        minter.mint(&blog_service()).await,
        Err(MintError::ChallengeCreation(ChallengerError::Shutdown))
    ));
}
