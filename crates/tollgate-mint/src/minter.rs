use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tollgate_challenger::Challenger;
use tollgate_core::{total_price, InvoiceState, MemoParams, PaymentHash, Service};
use tollgate_crypto::{KeyPair, PublicKey};

use crate::error::MintError;
use crate::token::Token;

/// What an access-control layer hands back to check an issued token.
/// Built per verification call; never persisted here.
#[derive(Debug, Clone)]
pub struct VerificationParams {
    /// The presented capability statement.
    pub token: Token,
    /// The payment identifier the presenter claims the token is bound to.
    pub payment_hash: PaymentHash,
    /// How long the settlement check may wait. Caller-supplied and
    /// authoritative.
    pub settle_timeout: Duration,
}

/// Issues and verifies payment-bound access tokens.
pub struct Minter {
    challenger: Arc<dyn Challenger>,
    keypair: KeyPair,
    authorized: HashSet<String>,
    token_validity: chrono::Duration,
}

impl Minter {
    /// Create a minter over a challenger. `authorized` is the catalog of
    /// service names this minter will vouch for.
    pub fn new(
        challenger: Arc<dyn Challenger>,
        keypair: KeyPair,
        authorized: HashSet<String>,
        token_validity: chrono::Duration,
    ) -> Self {
        Self {
            challenger,
            keypair,
            authorized,
            token_validity,
        }
    }

    /// The key tokens from this minter verify against.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Mint an access token for the requested services.
    ///
    /// Returns the signed token and the encoded invoice the client must
    /// pay. Each successful call binds a fresh, never-reused payment
    /// identifier.
    pub async fn mint(&self, services: &[Service]) -> Result<(Token, String), MintError> {
        let price = total_price(services)?;
        self.check_authorized(services)?;

        let memo = Self::memo_for(services);
        let (payment_request, payment_hash) = self
            .challenger
            .new_challenge(price, &memo)
            .await
            .map_err(MintError::ChallengeCreation)?;

        let token = Token::mint(
            services.to_vec(),
            payment_hash,
            self.token_validity,
            &self.keypair,
        )?;

        tracing::info!(
            token_id = %token.id,
            hash = %payment_hash,
            price = %price,
            "minted access token"
        );
        Ok((token, payment_request))
    }

    /// Verify a presented token. Fail-closed: every check must pass, and a
    /// settlement wait that times out denies access.
    pub async fn verify(&self, params: &VerificationParams) -> Result<(), MintError> {
        let token = &params.token;

        token.verify_signature(&self.keypair.public_key())?;

        if token.payment_hash != params.payment_hash {
            return Err(MintError::Unauthorized(
                "token is bound to a different payment".into(),
            ));
        }

        self.check_authorized(&token.services)?;

        if token.is_expired_at(Utc::now()) {
            return Err(MintError::Expired);
        }

        self.challenger
            .verify_invoice_status(token.payment_hash, InvoiceState::Settled, params.settle_timeout)
            .await
            .map_err(MintError::PaymentNotSettled)
    }

    fn check_authorized(&self, services: &[Service]) -> Result<(), MintError> {
        for service in services {
            if !self.authorized.contains(&service.name) {
                return Err(MintError::Unauthorized(format!(
                    "unknown service: {}",
                    service.name
                )));
            }
        }
        Ok(())
    }

    fn memo_for(services: &[Service]) -> MemoParams {
        // The first service names the memo; the rest ride along as fields.
        let mut memo = MemoParams::new(services[0].name.clone());
        if services.len() > 1 {
            let extras: Vec<&str> = services[1..].iter().map(|s| s.name.as_str()).collect();
            memo = memo.with_field("also", extras.join(","));
        }
        memo
    }
}
