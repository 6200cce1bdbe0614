//! PostgreSQL document store using sqlx.
//!
//! Each collection is a table of `(id UUID, seq BIGSERIAL, doc JSONB)`. The
//! `_id` field is never stored inside `doc`; it is projected back in from the
//! `id` column on every read. `seq` only exists to give list operations a
//! stable insertion order.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use super::{
    CategoryStats, Collection, DeleteResult, Document, DocumentId, Filter, ID_FIELD,
    InsertOneResult, Store, StoreError, UpdateResult,
};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn projection(collection: Collection) -> String {
    format!(
        "SELECT doc || jsonb_build_object('{ID_FIELD}', id::text) FROM {collection}"
    )
}

#[async_trait]
impl Store for PgStore {
    async fn find(&self, collection: Collection, filter: Filter) -> Result<Vec<Document>, StoreError> {
        let base = projection(collection);
        let rows: Vec<Json<Document>> = match filter {
            Filter::All => {
                sqlx::query_scalar(&format!("{base} ORDER BY seq"))
                    .fetch_all(&self.pool)
                    .await?
            }
            Filter::Id(id) => {
                sqlx::query_scalar(&format!("{base} WHERE id = $1 ORDER BY seq"))
                    .bind(id.0)
                    .fetch_all(&self.pool)
                    .await?
            }
            Filter::FieldEq(field, value) => {
                sqlx::query_scalar(&format!(
                    "{base} WHERE COALESCE(doc -> $1, 'null'::jsonb) = $2 ORDER BY seq"
                ))
                .bind(field)
                .bind(Json(value))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError> {
        let base = projection(collection);
        let row: Option<Json<Document>> = match filter {
            Filter::All => {
                sqlx::query_scalar(&format!("{base} ORDER BY seq LIMIT 1"))
                    .fetch_optional(&self.pool)
                    .await?
            }
            Filter::Id(id) => {
                sqlx::query_scalar(&format!("{base} WHERE id = $1"))
                    .bind(id.0)
                    .fetch_optional(&self.pool)
                    .await?
            }
            Filter::FieldEq(field, value) => {
                sqlx::query_scalar(&format!(
                    "{base} WHERE COALESCE(doc -> $1, 'null'::jsonb) = $2 ORDER BY seq LIMIT 1"
                ))
                .bind(field)
                .bind(Json(value))
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(row.map(|Json(doc)| doc))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> Result<InsertOneResult, StoreError> {
        let id = DocumentId::new();
        doc.remove(ID_FIELD);
        sqlx::query(&format!("INSERT INTO {collection} (id, doc) VALUES ($1, $2)"))
            .bind(id.0)
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await?;
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        mut set: Document,
    ) -> Result<UpdateResult, StoreError> {
        set.remove(ID_FIELD);
        let matched: bool =
            sqlx::query_scalar(&format!("SELECT EXISTS(SELECT 1 FROM {collection} WHERE id = $1)"))
                .bind(id.0)
                .fetch_one(&self.pool)
                .await?;
        if !matched {
            return Ok(UpdateResult::new(0, 0));
        }

        let modified = sqlx::query(&format!(
            "UPDATE {collection} SET doc = doc || $2 WHERE id = $1 AND doc || $2 <> doc"
        ))
        .bind(id.0)
        .bind(Json(Value::Object(set)))
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(UpdateResult::new(1, modified))
    }

    async fn delete_one(&self, collection: Collection, id: DocumentId) -> Result<DeleteResult, StoreError> {
        let deleted = sqlx::query(&format!("DELETE FROM {collection} WHERE id = $1"))
            .bind(id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(DeleteResult::new(deleted))
    }

    async fn delete_many(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<DeleteResult, StoreError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let deleted = sqlx::query(&format!("DELETE FROM {collection} WHERE id = ANY($1)"))
            .bind(ids)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(DeleteResult::new(deleted))
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, StoreError> {
        // Statistics-collector estimate, not an exact COUNT(*).
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(
                (SELECT n_live_tup FROM pg_stat_user_tables
                  WHERE relname = $1 AND schemaname = current_schema()),
                0
            )::bigint
            "#,
        )
        .bind(collection.name())
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn total_revenue(&self) -> Result<f64, StoreError> {
        let revenue: f64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COALESCE(SUM((doc ->> 'price')::float8), 0)::float8
              FROM {}
             WHERE jsonb_typeof(doc -> 'price') = 'number'
            "#,
            Collection::Payments
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(revenue)
    }

    async fn order_stats(&self) -> Result<Vec<CategoryStats>, StoreError> {
        let rows: Vec<(Json<Value>, i64, f64)> = sqlx::query_as(&format!(
            r#"
            SELECT COALESCE(m.doc -> 'category', 'null'::jsonb) AS category,
                   COUNT(*)::bigint AS quantity,
                   COALESCE(SUM(CASE WHEN jsonb_typeof(m.doc -> 'price') = 'number'
                                     THEN (m.doc ->> 'price')::float8 END), 0)::float8 AS revenue
              FROM {payments} p
             CROSS JOIN LATERAL jsonb_array_elements_text(
                   CASE WHEN jsonb_typeof(p.doc -> 'menuIds') = 'array'
                        THEN p.doc -> 'menuIds' ELSE '[]'::jsonb END
             ) AS item(menu_id)
              JOIN {menu} m ON m.id::text = lower(item.menu_id)
             GROUP BY 1
             ORDER BY 1
            "#,
            payments = Collection::Payments,
            menu = Collection::Menu,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(Json(category), quantity, revenue)| CategoryStats {
                category,
                quantity: quantity.max(0) as u64,
                revenue,
            })
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
