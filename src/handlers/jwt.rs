//! Bearer token issuing.
//!
//! Sign-in itself happens in the browser against the identity provider. The
//! client then trades the signed-in user object for a service token here and
//! sends it as `Authorization: Bearer <token>` on protected routes.

use actix_web::{HttpResponse, web};
use serde_json::{Map, Value};

use crate::{AppState, error::ApiError, models::TokenResponse};

/// `POST /jwt`
///
/// Signs whatever user object the client sends into a 24 hour bearer token.
/// No credential check happens here; the client has already signed the user
/// in with its identity provider.
///
/// # Arguments
/// * `user` - Arbitrary JSON object. `email` becomes the token's identity;
///   `iat` and `exp` are replaced, every other field is signed as-is.
///
/// # Success Response (200 OK)
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiIs..." }
/// ```
///
/// # Errors
/// * 400 when the body is not a JSON object.
/// * 500 when signing fails.
#[tracing::instrument(skip(state, user), fields(email = ?user.get("email")))]
pub async fn issue_token(
    state: web::Data<AppState>,
    user: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let token = state.tokens.issue(user.into_inner())?;
    tracing::info!("Token issued");
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
