//! Integration test: encrypted settlement receipts after a paid access.
//!
//! After mint → pay, the invoice is looked up and a receipt is published
//! over relays; only the intended recipient can read it.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use tollgate_challenger::Challenger;
use tollgate_core::Price;
use tollgate_crypto::{decrypt, x25519_public_key, EncryptedPayload, KeyPair};
use tollgate_integration_tests::{blog_service, direct_challenger, minter_for};
use tollgate_notify::{MemoryRelay, NotifyError, ReceiptParams, ReceiptPublisher, Relay};
use tollgate_settlement::{Invoice, SettlementBackend};

async fn paid_invoice() -> Invoice {
    let (backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());

    let (token, _) = minter.mint(&blog_service()).await.expect("mint");
    backend.settle(token.payment_hash).expect("settle");
    let invoice = backend
        .lookup_invoice(token.payment_hash)
        .await
        .expect("lookup");

    challenger.stop().await;
    invoice
}

#[tokio::test]
async fn test_receipt_reaches_all_relays_and_decrypts() {
    let invoice = paid_invoice().await;
    let payment_hash = invoice.payment_hash;

    let relays: Vec<Arc<MemoryRelay>> = vec![
        Arc::new(MemoryRelay::new("memory://relay-a")),
        Arc::new(MemoryRelay::new("memory://relay-b")),
    ];
    let service_key = KeyPair::generate();
    let service_pubkey = service_key.public_key();
    let publisher = ReceiptPublisher::new(
        service_key,
        "blog",
        relays
            .iter()
            .map(|r| Arc::clone(r) as Arc<dyn Relay>)
            .collect(),
    );

    let recipient = KeyPair::generate();
    let outcomes = publisher
        .publish_receipt(&ReceiptParams {
            recipient_pubkey: hex::encode(x25519_public_key(&recipient)),
            recipient_relays: Vec::new(),
            slug: "42".into(),
            price: Price::new(1000),
            invoice,
        })
        .await
        .expect("publish");

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.result.is_ok()));

    for relay in &relays {
        let events = relay.events();
        assert_eq!(events.len(), 1);
        events[0].verify(&service_pubkey).expect("event signature");

        let payload = EncryptedPayload::from_bytes(
            &BASE64.decode(&events[0].content).expect("base64 content"),
        )
        .expect("payload framing");
        let plaintext =
            String::from_utf8(decrypt(&payload, &recipient).expect("recipient decrypts"))
                .expect("utf8");
        assert!(plaintext.starts_with("blog slug=42"));
        assert!(plaintext.contains(&format!("payment_hash={payment_hash}")));
    }
}

#[tokio::test]
async fn test_one_dead_relay_does_not_lose_the_receipt() {
    let invoice = paid_invoice().await;

    let dead = Arc::new(MemoryRelay::new("memory://dead"));
    dead.set_failing(true);
    let live = Arc::new(MemoryRelay::new("memory://live"));

    let publisher = ReceiptPublisher::new(
        KeyPair::generate(),
        "blog",
        vec![
            Arc::clone(&dead) as Arc<dyn Relay>,
            Arc::clone(&live) as Arc<dyn Relay>,
        ],
    );

    let recipient = KeyPair::generate();
    let outcomes = publisher
        .publish_receipt(&ReceiptParams {
            recipient_pubkey: hex::encode(x25519_public_key(&recipient)),
            recipient_relays: Vec::new(),
            slug: "42".into(),
            price: Price::new(1000),
            invoice,
        })
        .await
        .expect("publish");

    assert!(matches!(outcomes[0].result, Err(NotifyError::Relay(_))));
    assert!(outcomes[1].result.is_ok());
    assert_eq!(live.events().len(), 1);
    assert!(dead.events().is_empty());
}

#[tokio::test]
async fn test_no_receipt_for_unpaid_invoice() {
    let (backend, challenger) = direct_challenger().await;
    let minter = minter_for(challenger.clone());
    let (token, _) = minter.mint(&blog_service()).await.unwrap();

    // Never settled: lookup returns the open invoice.
    let invoice = backend.lookup_invoice(token.payment_hash).await.unwrap();
    challenger.stop().await;

    let publisher = ReceiptPublisher::new(KeyPair::generate(), "blog", Vec::new());
    let recipient = KeyPair::generate();
    let result = publisher
        .publish_receipt(&ReceiptParams {
            recipient_pubkey: hex::encode(x25519_public_key(&recipient)),
            recipient_relays: Vec::new(),
            slug: "42".into(),
            price: Price::new(1000),
            invoice,
        })
        .await;
    assert!(matches!(result, Err(NotifyError::NotSettled)));
}
