//! HTTP-facing error type for the bistro backend.
//!
//! Every handler and extractor returns [`ApiError`] on failure. The response
//! body is always a JSON object with a single `message` field, which is the
//! shape browser clients already key on for 401/403 handling.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::{
    services::stripe::PaymentError,
    store::StoreError,
    token::TokenError,
};

/// Failure classes surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, expired or badly signed bearer token.
    #[error("unauthorized access")]
    Unauthorized,

    /// Valid token but the caller may not touch this resource.
    #[error("forbidden access")]
    Forbidden,

    /// A path or body identifier that does not parse as a document id.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Request body that deserialized but failed validation.
    #[error("{0}")]
    BadRequest(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("payment provider error: {0}")]
    Payment(#[from] PaymentError),

    #[error("token error: {0}")]
    Token(TokenError),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => Self::Unauthorized,
            other => Self::Token(other),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidId(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Payment(_) | Self::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        HttpResponse::build(status).json(json!({ "message": self.to_string() }))
    }
}
