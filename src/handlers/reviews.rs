//! Customer reviews.
//!
//! Reviews are seeded out of band; the API only reads them.

use actix_web::{HttpResponse, web};

use crate::{
    AppState,
    error::ApiError,
    store::{Collection, Filter},
};

/// `GET /reviews`
///
/// Public. Returns every review in insertion order.
///
/// # Errors
/// * 500 when the store read fails.
#[tracing::instrument(skip(state))]
pub async fn list_reviews(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let reviews = state.store.find(Collection::Reviews, Filter::All).await?;
    Ok(HttpResponse::Ok().json(reviews))
}
