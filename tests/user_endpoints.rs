//! User, token and admin-promotion endpoint tests.

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use bistro::{
    models::{AdminStatus, TokenResponse, UserExists},
    store::{Collection, Filter, InsertOneResult, UpdateResult},
};
use common::*;
use serde_json::json;

#[actix_web::test]
async fn jwt_endpoint_issues_verifiable_token() {
    let state = state();
    let keys = state.tokens.clone();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/jwt")
        .set_json(json!({ "email": "ann@bistro.test", "name": "Ann" }))
        .to_request();
    let body: TokenResponse = test::call_and_read_body_json(&app, req).await;

    let claims = keys.verify(&body.token).expect("token verifies");
    assert_eq!(claims.email, "ann@bistro.test");
    assert_eq!(claims.exp - claims.iat, 24 * 3600);
}

#[actix_web::test]
async fn new_user_becomes_admin_after_promotion() {
    let state = state();
    let admin = admin_header(&state).await;
    let ann = bearer(&state, "ann@bistro.test");
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "email": "ann@bistro.test", "name": "Ann" }))
        .to_request();
    let created: InsertOneResult = test::call_and_read_body_json(&app, req).await;
    assert!(created.acknowledged);

    let req = test::TestRequest::get()
        .uri("/users/admin/ann@bistro.test")
        .insert_header(ann.clone())
        .to_request();
    let status: AdminStatus = test::call_and_read_body_json(&app, req).await;
    assert!(!status.admin);

    let req = test::TestRequest::patch()
        .uri(&format!("/users/admin/{}", created.inserted_id))
        .insert_header(admin)
        .to_request();
    let updated: UpdateResult = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.matched_count, 1);
    assert_eq!(updated.modified_count, 1);

    let req = test::TestRequest::get()
        .uri("/users/admin/ann@bistro.test")
        .insert_header(ann)
        .to_request();
    let status: AdminStatus = test::call_and_read_body_json(&app, req).await;
    assert!(status.admin);
}

#[actix_web::test]
async fn admin_status_is_false_without_user_record() {
    let state = state();
    let auth = bearer(&state, "nobody@bistro.test");
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/users/admin/nobody@bistro.test")
        .insert_header(auth)
        .to_request();
    let status: AdminStatus = test::call_and_read_body_json(&app, req).await;
    assert!(!status.admin);
}

#[actix_web::test]
async fn duplicate_user_is_not_inserted() {
    let state = state();
    seed_user(&state, "ann@bistro.test", false).await;
    let store = state.store.clone();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "email": "ann@bistro.test", "name": "Again" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({ "message": "user already exists", "insertedId": null, "acknowledged": false })
    );
    let parsed: UserExists = serde_json::from_value(body).expect("shape");
    assert!(!parsed.acknowledged);

    let users = store
        .find(
            Collection::Users,
            Filter::FieldEq("email", json!("ann@bistro.test")),
        )
        .await
        .expect("find");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], "Seeded");
}

#[actix_web::test]
async fn admin_lists_and_deletes_users() {
    let state = state();
    let admin = admin_header(&state).await;
    let ann = seed_user(&state, "ann@bistro.test", false).await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(admin.clone())
        .to_request();
    let users: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u["_id"].is_string()));

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{ann}"))
        .insert_header(admin.clone())
        .to_request();
    let deleted: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted, json!({ "acknowledged": true, "deletedCount": 1 }));

    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(admin)
        .to_request();
    let users: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(users.len(), 1);
}

#[actix_web::test]
async fn malformed_user_id_is_a_client_error() {
    let state = state();
    let admin = admin_header(&state).await;
    let app = init_app!(state);

    for req in [
        test::TestRequest::patch().uri("/users/admin/not-an-id"),
        test::TestRequest::delete().uri("/users/not-an-id"),
    ] {
        let resp = test::call_service(&app, req.insert_header(admin.clone()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
