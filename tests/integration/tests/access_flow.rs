//! Integration test: the full paid-access lifecycle across crates.
//!
//! Drives mint → pay → verify using tollgate-mint, tollgate-challenger, and
//! tollgate-settlement together, including the fail-closed paths.

use std::time::Duration;

use tollgate_challenger::{Challenger, ChallengerError};
use tollgate_integration_tests::{blog_service, direct_challenger, minter_for};
use tollgate_mint::{MintError, Token, VerificationParams};

fn params(token: Token) -> VerificationParams {
    let payment_hash = token.payment_hash;
    VerificationParams {
        token,
        payment_hash,
        settle_timeout: Duration::from_millis(100),
    }
}

// =========================================================================
// Happy path: mint, pay, verify
// =========================================================================

#[tokio::test]
async fn test_mint_pay_verify() {
    let (backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());

    let (token, payment_request) = minter
        .mint(&blog_service())
        .await
        .expect("mint should succeed");
    assert!(payment_request.starts_with("mock1"));

    // Unpaid: every other check passes, access is still denied.
    let denied = minter.verify(&params(token.clone())).await;
    assert!(matches!(denied, Err(MintError::PaymentNotSettled(_))));

    backend.settle(token.payment_hash).expect("settle");
    minter
        .verify(&params(token))
        .await
        .expect("settled payment should grant access");

    challenger.stop().await;
}

#[tokio::test]
async fn test_token_survives_transit() {
    let (backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());

    let (token, _) = minter.mint(&blog_service()).await.unwrap();
    backend.settle(token.payment_hash).unwrap();

    // The client presents the encoded form it received over the wire.
    let encoded = token.encode().expect("encode");
    let presented = Token::decode(&encoded).expect("decode");
    assert_eq!(presented.id, token.id);

    minter.verify(&params(presented)).await.expect("verify");
    challenger.stop().await;
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let (backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());

    let (token, _) = minter.mint(&blog_service()).await.unwrap();
    backend.settle(token.payment_hash).unwrap();

    // Inflate the validity window after signing.
    let mut forged = token.clone();
    forged.expires_at = forged.expires_at + chrono::Duration::days(365);

    assert!(matches!(
        minter.verify(&params(forged)).await,
        Err(MintError::Unauthorized(_))
    ));
    challenger.stop().await;
}

// =========================================================================
// Settlement outcomes
// =========================================================================

#[tokio::test]
async fn test_settlement_during_verify_wait() {
    let (backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());

    let (token, _) = minter.mint(&blog_service()).await.unwrap();

    let hash = token.payment_hash;
    let payer = {
        let backend = backend.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            backend.settle(hash).unwrap();
        })
    };

    let mut p = params(token);
    p.settle_timeout = Duration::from_secs(2);
    minter
        .verify(&p)
        .await
        .expect("verify should observe the settlement mid-wait");

    payer.await.unwrap();
    challenger.stop().await;
}

#[tokio::test]
async fn test_canceled_invoice_denies_access_fast() {
    let (backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());

    let (token, _) = minter.mint(&blog_service()).await.unwrap();
    backend.cancel(token.payment_hash).unwrap();

    let mut p = params(token);
    p.settle_timeout = Duration::from_secs(30);

    // A terminal mismatch must deny well before the timeout.
    let started = std::time::Instant::now();
    let denied = minter.verify(&p).await;
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(matches!(
        denied,
        Err(MintError::PaymentNotSettled(
            ChallengerError::InvalidState { .. }
        ))
    ));
    challenger.stop().await;
}

#[tokio::test]
async fn test_transient_backend_failures_tolerated() {
    let (backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());

    let (token, _) = minter.mint(&blog_service()).await.unwrap();
    backend.settle(token.payment_hash).unwrap();

    // The first lookups fail; polling must ride through them.
    backend.fail_next_lookups(3);
    let mut p = params(token);
    p.settle_timeout = Duration::from_secs(2);
    minter.verify(&p).await.expect("verify");

    challenger.stop().await;
}

#[tokio::test]
async fn test_stopped_challenger_refuses_minting() {
    let (_backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());

    challenger.stop().await;
    assert!(matches!(
        minter.mint(&blog_service()).await,
        Err(MintError::ChallengeCreation(ChallengerError::Shutdown))
    ));
}
