//! Document store abstraction.
//!
//! The service treats its data as five schemaless collections of JSON
//! documents. Handlers only ever issue one generic operation per request
//! (find, insert, update, delete) or one of the two stats aggregations, so the
//! [`Store`] trait is deliberately small.
//!
//! Two backends exist:
//! - [`postgres::PgStore`]: one `(id UUID, doc JSONB)` table per collection.
//! - [`memory::MemoryStore`]: process-local, used by tests and local runs.

pub mod memory;
pub mod postgres;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A stored JSON object. Its `_id` field is assigned by the store on insert.
pub type Document = Map<String, Value>;

/// Field name under which a document's identifier is exposed.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

/// The five collections the service reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Menu,
    Reviews,
    Carts,
    Payments,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Self::Users,
        Self::Menu,
        Self::Reviews,
        Self::Carts,
        Self::Payments,
    ];

    /// Backing table name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Menu => "menu",
            Self::Reviews => "reviews",
            Self::Carts => "carts",
            Self::Payments => "payment",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque document identifier, a UUID on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for DocumentId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ApiError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Selection applied to `find` / `find_one`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Id(DocumentId),
    /// Top-level field equals the given JSON value.
    FieldEq(&'static str, Value),
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => doc
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .is_some_and(|s| s == id.to_string()),
            Self::FieldEq(field, value) => doc.get(*field).unwrap_or(&Value::Null) == value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<DocumentId>,
}

impl UpdateResult {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// One row of the per-category order breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: Value,
    pub quantity: u64,
    pub revenue: f64,
}

/// Numeric value of a JSON field for summing. Non-numbers count as zero.
pub(crate) fn numeric(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

/// Storage backend shared by every request handler.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find(&self, collection: Collection, filter: Filter) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Inserts `doc` under a fresh id. Any client supplied `_id` is discarded.
    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<InsertOneResult, StoreError>;

    /// Shallow-merges `set` into the document, like a `$set` update.
    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        set: Document,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult, StoreError>;

    async fn delete_many(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<DeleteResult, StoreError>;

    /// Fast approximate document count.
    async fn estimated_count(&self, collection: Collection) -> Result<u64, StoreError>;

    /// Sum of `price` across all payments, 0 when there are none.
    async fn total_revenue(&self) -> Result<f64, StoreError>;

    /// Payments' `menuIds` joined to menu items and grouped by category.
    /// Ids without a matching menu item are dropped.
    async fn order_stats(&self) -> Result<Vec<CategoryStats>, StoreError>;

    /// Releases backend resources. Called once at shutdown.
    async fn close(&self);
}
