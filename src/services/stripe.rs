//! Payment-intent creation against the Stripe REST API.
//!
//! Only one call is made: `POST /v1/payment_intents`, form encoded, with the
//! secret key as a bearer token. The client secret from the response is handed
//! back to the browser, which completes the card payment itself.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("request to payment provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("payment provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Provider side of checkout. Returns the intent's client secret.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, amount_cents: i64) -> Result<String, PaymentError>;
}

/// Converts a decimal price to the provider's integer minor units.
///
/// The fractional part of a cent is truncated, never rounded.
pub fn amount_in_cents(price: f64) -> i64 {
    (price * 100.0).trunc() as i64
}

#[derive(Deserialize)]
struct PaymentIntent {
    client_secret: String,
}

#[derive(Clone)]
pub struct StripeService {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeService {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeService {
    #[tracing::instrument(skip(self))]
    async fn create_payment_intent(&self, amount_cents: i64) -> Result<String, PaymentError> {
        let url = format!(
            "{}/v1/payment_intents",
            self.api_base.trim_end_matches('/')
        );
        let amount = amount_cents.to_string();

        let res = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", "usd"),
                ("payment_method_types[]", "card"),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status_code = status.as_u16(), "Payment provider rejected intent");
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let intent: PaymentIntent = res.json().await?;
        tracing::info!(amount_cents, "Payment intent created");
        Ok(intent.client_secret)
    }
}
