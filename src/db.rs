//! Database connection utilities for the bistro backend.
//!
//! Provides the Postgres pool and the table bootstrap run once at startup.

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::store::{Collection, StoreError};

/// Establishes a connection pool to the Postgres database at `database_url`.
pub async fn connect_pg_pool(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Creates the collection tables when they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for collection in Collection::ALL {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {collection} (
                id  UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                doc JSONB NOT NULL
            )
            "#
        ))
        .execute(pool)
        .await?;
        tracing::debug!(collection = %collection, "Collection table ready");
    }
    Ok(())
}
