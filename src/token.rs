//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the shared `ACCESS_TOKEN_SECRET`. The
//! payload is whatever user object the client posted to `/jwt`, stamped with
//! `iat` and a fixed 24 hour `exp`. There is no server-side token store, so a
//! token stays valid until it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Lifetime of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, expiry or shape check failed.
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Encode(jsonwebtoken::errors::Error),
}

/// Decoded token payload.
///
/// `email` is the only claim the service reads. Everything else the client
/// signed in with rides along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(default)]
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs `user` into a token valid for [`TOKEN_TTL_HOURS`].
    pub fn issue(&self, mut user: Map<String, Value>) -> Result<String, TokenError> {
        let now = Utc::now();
        let email = match user.remove("email") {
            Some(Value::String(email)) => email,
            _ => String::new(),
        };
        user.remove("iat");
        user.remove("exp");

        let claims = Claims {
            email,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            extra: user,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}
