//! User endpoints.
//!
//! Users are created on first sign-in and afterwards only ever promoted to
//! admin or deleted. Email is the natural key, enforced by the existence
//! check in [`create_user`] rather than by a store constraint.

use actix_web::{HttpResponse, web};
use serde_json::{Map, Value};

use crate::{
    AppState,
    auth_middleware::AuthMiddleware,
    error::ApiError,
    handlers::admin::guard::{AdminMiddleware, is_admin},
    models::{AdminStatus, Role, UserExists},
    store::{Collection, Document, DocumentId, Filter},
};

/// `GET /users`
#[tracing::instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn list_users(
    admin: AdminMiddleware,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let users = state.store.find(Collection::Users, Filter::All).await?;
    tracing::info!(user_count = users.len(), "Admin fetched user list");
    Ok(HttpResponse::Ok().json(users))
}

/// `GET /users/admin/{email}`
///
/// Self-only. A caller without a user record is simply not an admin.
///
/// # Success Response (200 OK)
/// ```json
/// { "admin": true }
/// ```
///
/// # Errors
/// * 401 without a valid bearer token.
/// * 403 when the path email is not the caller's.
#[tracing::instrument(skip(state, user))]
pub async fn admin_status(
    user: AuthMiddleware,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let email = path.into_inner();
    user.require_email(&email)?;

    let record = state
        .store
        .find_one(Collection::Users, Filter::FieldEq("email", Value::String(email)))
        .await?;
    Ok(HttpResponse::Ok().json(AdminStatus {
        admin: is_admin(record.as_ref()),
    }))
}

/// `POST /users`
///
/// Inserts the user unless a record with the same email exists, in which case
/// an unacknowledged result is returned and nothing is written.
#[tracing::instrument(skip(state, user), fields(email = ?user.get("email")))]
pub async fn create_user(
    state: web::Data<AppState>,
    user: web::Json<Document>,
) -> Result<HttpResponse, ApiError> {
    let user = user.into_inner();
    let email = user.get("email").cloned().unwrap_or(Value::Null);

    let existing = state
        .store
        .find_one(Collection::Users, Filter::FieldEq("email", email))
        .await?;
    if existing.is_some() {
        tracing::debug!("User already exists");
        return Ok(HttpResponse::Ok().json(UserExists::default()));
    }

    let result = state.store.insert_one(Collection::Users, user).await?;
    tracing::info!(id = %result.inserted_id, "User created");
    Ok(HttpResponse::Ok().json(result))
}

/// `PATCH /users/admin/{id}`
///
/// Sets the stored role marker. Takes effect on the promoted user's next
/// request, since roles are never cached.
///
/// # Errors
/// * 400 when `id` is not a valid document id.
/// * 401 / 403 from the admin guard.
#[tracing::instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn make_admin(
    admin: AdminMiddleware,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: DocumentId = path.parse()?;
    let mut set = Map::new();
    set.insert("role".into(), Value::String(Role::ADMIN_MARKER.into()));

    let result = state.store.update_one(Collection::Users, id, set).await?;
    tracing::info!(%id, matched = result.matched_count, "User promoted to admin");
    Ok(HttpResponse::Ok().json(result))
}

/// `DELETE /users/{id}`
#[tracing::instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn delete_user(
    admin: AdminMiddleware,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: DocumentId = path.parse()?;
    let result = state.store.delete_one(Collection::Users, id).await?;
    tracing::info!(%id, deleted = result.deleted_count, "User deleted");
    Ok(HttpResponse::Ok().json(result))
}
