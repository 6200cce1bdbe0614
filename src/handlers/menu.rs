//! Menu endpoints.
//!
//! Reads and the field update are public; insert and delete require an
//! administrator.

use actix_web::{HttpResponse, web};

use crate::{
    AppState,
    auth_middleware::AuthMiddleware,
    error::ApiError,
    handlers::admin::guard::{AdminMiddleware, admin_guard},
    models::MenuItemUpdate,
    store::{Collection, Document, DocumentId, Filter},
};

/// `GET /menu`
#[tracing::instrument(skip(state))]
pub async fn list_menu(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let items = state.store.find(Collection::Menu, Filter::All).await?;
    tracing::debug!(count = items.len(), "Listed menu items");
    Ok(HttpResponse::Ok().json(items))
}

/// `POST /menu/addItem`
///
/// Stores the posted object as a new menu item.
///
/// The body is taken raw and only parsed once the role check has passed, so a
/// non-admin always gets 403 no matter what they sent.
///
/// # Errors
/// * 401 when the bearer token is missing or invalid.
/// * 403 when the caller is not an administrator.
/// * 400 when the body is not a JSON object.
#[tracing::instrument(skip(state, user, body), fields(admin = %user.email))]
pub async fn add_item(
    user: AuthMiddleware,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    admin_guard(state.store.as_ref(), &user).await?;

    let item: Document = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid menu item: {e}")))?;
    let result = state.store.insert_one(Collection::Menu, item).await?;
    tracing::info!(id = %result.inserted_id, "Menu item added");
    Ok(HttpResponse::Ok().json(result))
}

/// `GET /menu/{id}`. Responds with `null` when no item has that id.
#[tracing::instrument(skip(state))]
pub async fn get_item(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: DocumentId = path.parse()?;
    let item = state.store.find_one(Collection::Menu, Filter::Id(id)).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// `PATCH /menu/{id}`
///
/// Overwrites `name`, `category`, `price`, `recipe` and `image`. Fields left
/// out of the body are stored as `null`. Not admin gated.
#[tracing::instrument(skip(state, update))]
pub async fn update_item(
    state: web::Data<AppState>,
    path: web::Path<String>,
    update: web::Json<MenuItemUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id: DocumentId = path.parse()?;
    let result = state
        .store
        .update_one(Collection::Menu, id, update.into_inner().into())
        .await?;
    tracing::info!(
        %id,
        matched = result.matched_count,
        modified = result.modified_count,
        "Menu item updated"
    );
    Ok(HttpResponse::Ok().json(result))
}

/// `DELETE /menu/{id}`
#[tracing::instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn delete_item(
    admin: AdminMiddleware,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: DocumentId = path.parse()?;
    let result = state.store.delete_one(Collection::Menu, id).await?;
    tracing::info!(%id, deleted = result.deleted_count, "Menu item deleted");
    Ok(HttpResponse::Ok().json(result))
}
