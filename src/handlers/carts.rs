//! Shopping cart endpoints. None of them check the caller's identity.

use actix_web::{HttpResponse, web};
use serde_json::Value;

use crate::{
    AppState,
    error::ApiError,
    models::CartQuery,
    store::{Collection, Document, DocumentId, Filter},
};

/// `GET /carts?email=`
///
/// Without an `email` parameter only carts that have no owner email match.
#[tracing::instrument(skip(state, query), fields(email = ?query.email))]
pub async fn list_carts(
    state: web::Data<AppState>,
    query: web::Query<CartQuery>,
) -> Result<HttpResponse, ApiError> {
    let owner = query.into_inner().email.map_or(Value::Null, Value::String);
    let carts = state
        .store
        .find(Collection::Carts, Filter::FieldEq("email", owner))
        .await?;
    Ok(HttpResponse::Ok().json(carts))
}

/// `POST /carts`
#[tracing::instrument(skip(state, item))]
pub async fn add_to_cart(
    state: web::Data<AppState>,
    item: web::Json<Document>,
) -> Result<HttpResponse, ApiError> {
    let result = state
        .store
        .insert_one(Collection::Carts, item.into_inner())
        .await?;
    tracing::info!(id = %result.inserted_id, "Cart item added");
    Ok(HttpResponse::Ok().json(result))
}

/// `DELETE /carts/{id}`
///
/// # Errors
/// * 400 when `id` is not a valid document id.
#[tracing::instrument(skip(state))]
pub async fn delete_cart_item(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: DocumentId = path.parse()?;
    let result = state.store.delete_one(Collection::Carts, id).await?;
    Ok(HttpResponse::Ok().json(result))
}
