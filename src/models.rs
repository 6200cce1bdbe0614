//! Shared application state and the request/response shapes of the API.
//!
//! Stored documents stay schemaless (`store::Document`). The structs here only
//! cover the fields the service itself reads or writes; everything else a
//! client sends is persisted untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    config::Settings,
    db,
    services::{
        mailgun::{Mailer, MailgunService},
        stripe::{PaymentGateway, StripeService},
    },
    store::{DeleteResult, Document, InsertOneResult, PgStore, Store, StoreError},
    token::TokenKeys,
};

/// Shared application state for all handlers.
///
/// Built once at startup and cloned into every actix worker; all fields are
/// cheap handles onto shared resources.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenKeys,
    pub payments: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenKeys,
        payments: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            tokens,
            payments,
            mailer,
        }
    }

    /// Connects to Postgres, bootstraps the collection tables and wires the
    /// Stripe and Mailgun clients from `settings`.
    pub async fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        let pool = db::connect_pg_pool(&settings.database_url, settings.db_max_connections).await?;
        db::ensure_schema(&pool).await?;

        Ok(Self::new(
            Arc::new(PgStore::new(pool)),
            TokenKeys::new(&settings.access_token_secret),
            Arc::new(StripeService::new(
                &settings.stripe_api_base,
                &settings.stripe_secret_key,
            )),
            Arc::new(MailgunService::new(
                &settings.mailgun_api_base,
                &settings.mailgun_api_key,
                &settings.mailgun_domain,
                &settings.mail_from,
            )),
        ))
    }
}

/// Application-level user role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Role marker stored on user documents.
    pub const ADMIN_MARKER: &'static str = "admin";

    /// Reads the role of a stored user document. Anything but the admin
    /// marker is a regular user.
    pub fn of(user: &Document) -> Self {
        match user.get("role").and_then(Value::as_str) {
            Some(Self::ADMIN_MARKER) => Self::Admin,
            _ => Self::User,
        }
    }
}

/// Editable menu fields. Absent fields are written as `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemUpdate {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub recipe: Value,
    #[serde(default)]
    pub image: Value,
}

impl From<MenuItemUpdate> for Document {
    fn from(update: MenuItemUpdate) -> Self {
        let mut set = Map::new();
        set.insert("name".into(), update.name);
        set.insert("category".into(), update.category);
        set.insert("price".into(), update.price);
        set.insert("recipe".into(), update.recipe);
        set.insert("image".into(), update.image);
        set
    }
}

/// The checkout fields the payment handler acts on.
///
/// Only `cartIds` is checked. `email` and `transactionId` are read as whatever
/// JSON the client sent; the payment is stored as-is either way.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFields {
    pub cart_ids: Vec<String>,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub transaction_id: Value,
}

impl CheckoutFields {
    /// Recipient for the confirmation email, when `email` is a string.
    pub fn recipient(&self) -> Option<&str> {
        self.email.as_str()
    }

    /// Transaction id to quote, empty unless `transactionId` is a string.
    pub fn transaction_ref(&self) -> &str {
        self.transaction_id.as_str().unwrap_or("")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentIntentRequest {
    #[validate(range(min = 0.0))]
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub payment_result: InsertOneResult,
    pub delete_result: DeleteResult,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminStatus {
    pub admin: bool,
}

/// Reply to `POST /users` when the email is already registered.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExists {
    pub message: String,
    pub inserted_id: Option<String>,
    pub acknowledged: bool,
}

impl Default for UserExists {
    fn default() -> Self {
        Self {
            message: "user already exists".to_string(),
            inserted_id: None,
            acknowledged: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: u64,
    pub menu_items: u64,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub email: Option<String>,
}
