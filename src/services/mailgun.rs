//! Order confirmation email via the Mailgun messages API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("request to mail provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("mail provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Email {
    /// Checkout confirmation quoting the provider transaction id.
    pub fn order_confirmation(to: &str, transaction_id: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Bistro boss order confirmation".to_string(),
            text: format!("Thank you for your order. Your transaction id: {transaction_id}"),
            html: format!(
                r#"<div>
  <h2>Thank you for your order</h2>
  <h4>Your Transaction Id: <strong>{transaction_id}</strong></h4>
</div>"#
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends `email`, returning the provider's message id.
    async fn send(&self, email: &Email) -> Result<String, MailError>;
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Clone)]
pub struct MailgunService {
    client: Client,
    api_base: String,
    api_key: String,
    domain: String,
    from: String,
}

impl MailgunService {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        domain: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            domain: domain.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for MailgunService {
    #[tracing::instrument(skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: &Email) -> Result<String, MailError> {
        let url = format!(
            "{}/v3/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.domain
        );

        let res = self
            .client
            .post(url)
            .basic_auth("api", Some(&self.api_key))
            .form(&[
                ("from", self.from.as_str()),
                ("to", email.to.as_str()),
                ("subject", email.subject.as_str()),
                ("text", email.text.as_str()),
                ("html", email.html.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(MailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let sent: SendResponse = res.json().await?;
        Ok(sent.id)
    }
}
