//! `PgStore` tests against a live Postgres.
//!
//! Each test works in its own throwaway schema so they can run in parallel.
//! Without `DATABASE_URL` (environment or `.env`) every test returns early.

#[macro_use]
mod common;

use std::{str::FromStr, sync::Arc, time::Duration};

use actix_web::test;
use bistro::{
    db,
    models::AdminStats,
    store::{CategoryStats, Collection, DocumentId, Filter, PgStore, Store, UpdateResult},
};
use common::*;
use serde_json::{Value, json};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use uuid::Uuid;

/// A store bound to a fresh schema, with the name needed to drop it again.
struct ScopedStore {
    store: Arc<PgStore>,
    schema: String,
}

impl ScopedStore {
    async fn drop_schema(self) {
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(self.store.pool())
            .await
            .expect("drop schema");
        self.store.close().await;
    }
}

async fn scoped_store() -> Option<ScopedStore> {
    dotenv::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return None;
    };

    let schema = format!("bistro_test_{}", Uuid::new_v4().simple());
    let setup = PgPool::connect(&url).await.expect("connect");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&setup)
        .await
        .expect("create schema");
    setup.close().await;

    let options = PgConnectOptions::from_str(&url)
        .expect("database url")
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .expect("connect to scoped schema");
    db::ensure_schema(&pool).await.expect("create tables");

    Some(ScopedStore {
        store: Arc::new(PgStore::new(pool)),
        schema,
    })
}

#[actix_web::test]
async fn order_stats_groups_salads_over_http() {
    let Some(scope) = scoped_store().await else { return };
    let state = state_over(scope.store.clone());
    let admin = admin_header(&state).await;
    let a = insert(&state, Collection::Menu, json!({ "name": "A", "category": "Salad", "price": 10 })).await;
    let b = insert(&state, Collection::Menu, json!({ "name": "B", "category": "Salad", "price": 20 })).await;
    insert(
        &state,
        Collection::Payments,
        json!({ "email": "a@bistro.test", "price": 30, "menuIds": [a.to_string(), b.to_string()] }),
    )
    .await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/order-stats")
        .insert_header(admin)
        .to_request();
    let rows: Vec<CategoryStats> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        rows,
        vec![CategoryStats {
            category: json!("Salad"),
            quantity: 2,
            revenue: 30.0,
        }]
    );

    scope.drop_schema().await;
}

#[actix_web::test]
async fn order_stats_drops_deleted_and_malformed_ids() {
    let Some(scope) = scoped_store().await else { return };
    let store = scope.store.clone();
    let soup = store
        .insert_one(Collection::Menu, doc(json!({ "category": "soup", "price": 6 })))
        .await
        .expect("insert")
        .inserted_id;
    let gone = store
        .insert_one(Collection::Menu, doc(json!({ "category": "dessert", "price": 9 })))
        .await
        .expect("insert")
        .inserted_id;
    store
        .insert_one(
            Collection::Payments,
            doc(json!({
                "menuIds": [
                    soup.to_string(),
                    gone.to_string(),
                    soup.to_string().to_uppercase(),
                    "garbage"
                ]
            })),
        )
        .await
        .expect("insert");
    store
        .insert_one(Collection::Payments, doc(json!({ "menuIds": "not-a-list" })))
        .await
        .expect("insert");
    store.delete_one(Collection::Menu, gone).await.expect("delete");

    let rows = store.order_stats().await.expect("stats");
    assert_eq!(
        rows,
        vec![CategoryStats {
            category: json!("soup"),
            quantity: 2,
            revenue: 12.0,
        }]
    );

    scope.drop_schema().await;
}

#[actix_web::test]
async fn admin_stats_revenue_is_zero_until_first_payment() {
    let Some(scope) = scoped_store().await else { return };
    let state = state_over(scope.store.clone());
    let admin = admin_header(&state).await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/admin-stats")
        .insert_header(admin.clone())
        .to_request();
    let stats: AdminStats = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.revenue, 0.0);

    for price in [json!(12.5), json!("n/a"), json!(7.5)] {
        scope
            .store
            .insert_one(Collection::Payments, doc(json!({ "price": price })))
            .await
            .expect("insert");
    }

    let req = test::TestRequest::get()
        .uri("/admin-stats")
        .insert_header(admin)
        .to_request();
    let stats: AdminStats = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.revenue, 20.0);

    scope.drop_schema().await;
}

#[actix_web::test]
async fn estimated_count_follows_table_statistics() {
    let Some(scope) = scoped_store().await else { return };
    let store = scope.store.clone();
    for name in ["Soup", "Stew", "Salad"] {
        store
            .insert_one(Collection::Menu, doc(json!({ "name": name })))
            .await
            .expect("insert");
    }
    sqlx::query("ANALYZE menu")
        .execute(store.pool())
        .await
        .expect("analyze");

    // statistics are published asynchronously on older servers
    let mut count = 0;
    for _ in 0..30 {
        count = store.estimated_count(Collection::Menu).await.expect("count");
        if count == 3 {
            break;
        }
        actix_web::rt::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(count, 3);
    assert_eq!(store.estimated_count(Collection::Reviews).await.expect("count"), 0);

    scope.drop_schema().await;
}

#[actix_web::test]
async fn owner_filter_treats_missing_email_as_null() {
    let Some(scope) = scoped_store().await else { return };
    let store = scope.store.clone();
    for cart in [
        json!({ "email": "a@bistro.test", "menuId": "m1" }),
        json!({ "email": "b@bistro.test", "menuId": "m2" }),
        json!({ "menuId": "m3" }),
    ] {
        store
            .insert_one(Collection::Carts, doc(cart))
            .await
            .expect("insert");
    }

    let owned = store
        .find(Collection::Carts, Filter::FieldEq("email", json!("a@bistro.test")))
        .await
        .expect("find");
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0]["menuId"], "m1");

    let ownerless = store
        .find(Collection::Carts, Filter::FieldEq("email", Value::Null))
        .await
        .expect("find");
    assert_eq!(ownerless.len(), 1);
    assert_eq!(ownerless[0]["menuId"], "m3");

    scope.drop_schema().await;
}

#[actix_web::test]
async fn update_counts_only_real_changes() {
    let Some(scope) = scoped_store().await else { return };
    let store = scope.store.clone();
    let id = store
        .insert_one(Collection::Menu, doc(json!({ "name": "Soup", "_id": "ignored" })))
        .await
        .expect("insert")
        .inserted_id;

    let set = doc(json!({ "name": "Stew", "price": 7 }));
    let first = store
        .update_one(Collection::Menu, id, set.clone())
        .await
        .expect("update");
    let second = store
        .update_one(Collection::Menu, id, set)
        .await
        .expect("update");
    let missing = store
        .update_one(Collection::Menu, DocumentId::new(), doc(json!({ "name": "x" })))
        .await
        .expect("update");

    assert_eq!(first, UpdateResult::new(1, 1));
    assert_eq!(second, UpdateResult::new(1, 0));
    assert_eq!(missing, UpdateResult::new(0, 0));

    let stored = store
        .find_one(Collection::Menu, Filter::Id(id))
        .await
        .expect("find")
        .expect("present");
    assert_eq!(stored["_id"], json!(id.to_string()));
    assert_eq!(stored["name"], "Stew");

    scope.drop_schema().await;
}
