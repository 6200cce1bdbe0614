//! Admin role guard.
//!
//! Authorization runs strictly after authentication: [`AdminMiddleware`] first
//! extracts an [`AuthMiddleware`] (401 on failure) and only then reads the
//! caller's user document to check the stored role (403 on failure). The role
//! is looked up on every request; nothing is cached, so a promotion or a
//! deleted user takes effect on the very next call.

use std::ops::Deref;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{FutureExt, LocalBoxFuture};

use crate::{
    AppState,
    auth_middleware::AuthMiddleware,
    error::ApiError,
    models::Role,
    store::{Collection, Document, Filter, Store},
};

/// Returns `true` when the stored user document carries the admin marker.
pub fn is_admin(user: Option<&Document>) -> bool {
    user.is_some_and(|u| Role::of(u) == Role::Admin)
}

/// Rejects callers whose stored user record is missing or not an admin.
///
/// # Errors
/// * [`ApiError::Forbidden`] when the caller is not an administrator.
/// * [`ApiError::Store`] when the lookup itself fails.
pub async fn admin_guard(store: &dyn Store, user: &AuthMiddleware) -> Result<(), ApiError> {
    let record = store
        .find_one(
            Collection::Users,
            Filter::FieldEq("email", user.email.clone().into()),
        )
        .await?;

    if is_admin(record.as_ref()) {
        Ok(())
    } else {
        tracing::warn!(email = %user.email, "Admin access denied");
        Err(ApiError::Forbidden)
    }
}

/// Extractor for admin-only routes. Derefs to the caller's [`AuthMiddleware`].
#[derive(Debug, Clone)]
pub struct AdminMiddleware(pub AuthMiddleware);

impl Deref for AdminMiddleware {
    type Target = AuthMiddleware;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AdminMiddleware {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth = AuthMiddleware::from_request(req, payload).into_inner();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        async move {
            let user = auth?;
            let state = state.ok_or_else(|| {
                tracing::error!("AppState missing from request");
                ApiError::Forbidden
            })?;
            admin_guard(state.store.as_ref(), &user).await?;
            tracing::debug!(email = %user.email, "Admin access granted");
            Ok(AdminMiddleware(user))
        }
        .boxed_local()
    }
}
