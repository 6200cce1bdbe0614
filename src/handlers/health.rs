//! Liveness endpoint for the bistro backend.

use actix_web::{HttpResponse, Responder};

/// `GET /`. Plain-text banner confirming the service is up.
#[tracing::instrument]
pub async fn root() -> impl Responder {
    tracing::debug!("Liveness endpoint called");
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Bistro boss server is running")
}
