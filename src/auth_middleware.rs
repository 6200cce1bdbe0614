//! Authentication extractor for bearer-token protected routes.
//!
//! # Overview
//! [`AuthMiddleware`] is an Actix Web extractor that verifies the
//! `Authorization: Bearer <token>` header against the shared signing secret
//! and hands the decoded [`Claims`] to the handler. Handlers opt in by taking
//! `user: AuthMiddleware` as an argument; routes without it stay public.
//!
//! On success the claims are also stored in the request extensions so the
//! request logging middleware can attribute the request to a caller.
//!
//! # Errors
//! Returns 401 Unauthorized if the header is missing, is not a bearer
//! credential, or the token fails signature or expiry verification.

use std::ops::Deref;

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};
use tracing::Span;

use crate::{AppState, error::ApiError, token::Claims};

/// Verified token claims of the calling user.
#[derive(Debug, Clone)]
pub struct AuthMiddleware(pub Claims);

impl Deref for AuthMiddleware {
    type Target = Claims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AuthMiddleware {
    /// Guards self-only routes: the path email must be the caller's own.
    pub fn require_email(&self, email: &str) -> Result<(), ApiError> {
        if self.email == email {
            Ok(())
        } else {
            tracing::warn!(
                caller = %self.email,
                requested = %email,
                "Caller requested another user's resource"
            );
            Err(ApiError::Forbidden)
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, ApiError> {
    let header = req.headers().get("Authorization").ok_or_else(|| {
        tracing::warn!("No Authorization header present in request");
        ApiError::Unauthorized
    })?;

    header
        .to_str()
        .map_err(|e| {
            tracing::warn!(error = ?e, "Invalid Authorization header format");
            ApiError::Unauthorized
        })?
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            tracing::warn!("Authorization header missing Bearer prefix");
            ApiError::Unauthorized
        })
}

impl FromRequest for AuthMiddleware {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthMiddleware, ApiError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState missing from request");
        ApiError::Unauthorized
    })?;

    let token = bearer_token(req)?;
    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!(error = %e, "Token verification failed");
        ApiError::Unauthorized
    })?;

    tracing::debug!(email = %claims.email, "Token verified");
    Span::current().record("user_email", claims.email.as_str());
    req.extensions_mut().insert(claims.clone());
    Ok(AuthMiddleware(claims))
}
