//! Shared fixtures for the endpoint tests.
//!
//! Every test builds its own [`AppState`] over a fresh in-memory store with
//! stubbed payment and mail providers, so no network or database is needed.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bistro::{
    AppState,
    services::{Email, MailError, Mailer, PaymentError, PaymentGateway},
    store::{
        CategoryStats, Collection, DeleteResult, Document, DocumentId, Filter, InsertOneResult,
        MemoryStore, Store, StoreError, UpdateResult,
    },
    token::TokenKeys,
};
use serde_json::{Value, json};

pub const SECRET: &str = "test-secret";

/// Builds an actix test service over `configure_routes`.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(bistro::handlers::configure_routes),
        )
        .await
    };
}

/// Returns `pi_<amount>_secret` for every request.
pub struct StubGateway;

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_payment_intent(&self, amount_cents: i64) -> Result<String, PaymentError> {
        Ok(format!("pi_{amount_cents}_secret"))
    }
}

pub struct FailingGateway;

#[async_trait]
impl PaymentGateway for FailingGateway {
    async fn create_payment_intent(&self, _amount_cents: i64) -> Result<String, PaymentError> {
        Err(PaymentError::Provider {
            status: 402,
            body: "card declined".into(),
        })
    }
}

/// Records every message; fails delivery when `fail` is set.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<Email>>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<String, MailError> {
        self.sent.lock().expect("mailer lock").push(email.clone());
        if self.fail {
            Err(MailError::Provider {
                status: 500,
                body: "mail provider down".into(),
            })
        } else {
            Ok("<message@test>".into())
        }
    }
}

/// In-memory store whose lookups yield to the runtime before answering, the
/// way a networked backend does.
#[derive(Clone, Default)]
pub struct YieldingStore {
    inner: MemoryStore,
}

#[async_trait]
impl Store for YieldingStore {
    async fn find(&self, collection: Collection, filter: Filter) -> Result<Vec<Document>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.find(collection, filter).await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.find_one(collection, filter).await
    }

    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<InsertOneResult, StoreError> {
        self.inner.insert_one(collection, doc).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        set: Document,
    ) -> Result<UpdateResult, StoreError> {
        self.inner.update_one(collection, id, set).await
    }

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult, StoreError> {
        self.inner.delete_one(collection, id).await
    }

    async fn delete_many(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<DeleteResult, StoreError> {
        self.inner.delete_many(collection, ids).await
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, StoreError> {
        self.inner.estimated_count(collection).await
    }

    async fn total_revenue(&self) -> Result<f64, StoreError> {
        self.inner.total_revenue().await
    }

    async fn order_stats(&self) -> Result<Vec<CategoryStats>, StoreError> {
        self.inner.order_stats().await
    }

    async fn close(&self) {}
}

/// State over `store` with the stub gateway and a recording mailer.
pub fn state_over(store: Arc<dyn Store>) -> AppState {
    AppState::new(
        store,
        TokenKeys::new(SECRET),
        Arc::new(StubGateway),
        Arc::new(RecordingMailer::default()),
    )
}

pub fn state_with(payments: Arc<dyn PaymentGateway>, mailer: RecordingMailer) -> AppState {
    AppState::new(
        Arc::new(MemoryStore::new()),
        TokenKeys::new(SECRET),
        payments,
        Arc::new(mailer),
    )
}

pub fn state() -> AppState {
    state_with(Arc::new(StubGateway), RecordingMailer::default())
}

pub fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("json object")
}

/// `Authorization` header value carrying a valid token for `email`.
pub fn bearer(state: &AppState, email: &str) -> (&'static str, String) {
    let token = state
        .tokens
        .issue(doc(json!({ "email": email, "name": "Test User" })))
        .expect("issue token");
    ("Authorization", format!("Bearer {token}"))
}

pub async fn insert(state: &AppState, collection: Collection, value: Value) -> DocumentId {
    state
        .store
        .insert_one(collection, doc(value))
        .await
        .expect("insert")
        .inserted_id
}

pub async fn seed_user(state: &AppState, email: &str, admin: bool) -> DocumentId {
    let mut user = json!({ "email": email, "name": "Seeded" });
    if admin {
        user["role"] = json!("admin");
    }
    insert(state, Collection::Users, user).await
}

/// Seeds an admin user and returns its auth header.
pub async fn admin_header(state: &AppState) -> (&'static str, String) {
    seed_user(state, "admin@bistro.test", true).await;
    bearer(state, "admin@bistro.test")
}
