//! Admin dashboard statistics.
//!
//! Both endpoints are read-only and take no parameters. Counts come from the
//! store's estimated count, so they can lag behind very recent writes.

use actix_web::{HttpResponse, web};

use crate::{
    AppState,
    error::ApiError,
    handlers::admin::guard::AdminMiddleware,
    models::AdminStats,
    store::Collection,
};

/// `GET /admin-stats`
///
/// # Success Response (200 OK)
/// ```json
/// { "users": 12, "menuItems": 40, "orders": 7, "revenue": 183.5 }
/// ```
/// `revenue` is the sum of `price` over all payments and is `0` when no
/// payment exists.
#[tracing::instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn admin_stats(
    admin: AdminMiddleware,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let store = state.store.as_ref();
    let stats = AdminStats {
        users: store.estimated_count(Collection::Users).await?,
        menu_items: store.estimated_count(Collection::Menu).await?,
        orders: store.estimated_count(Collection::Payments).await?,
        revenue: store.total_revenue().await?,
    };

    tracing::info!(
        users = stats.users,
        menu_items = stats.menu_items,
        orders = stats.orders,
        revenue = stats.revenue,
        "Admin stats retrieved"
    );
    Ok(HttpResponse::Ok().json(stats))
}

/// `GET /order-stats`
///
/// Per-category line-item count and revenue over every payment's `menuIds`:
/// ```json
/// [{ "category": "salad", "quantity": 2, "revenue": 30 }]
/// ```
/// Line items whose menu record no longer exists are not counted anywhere.
#[tracing::instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn order_stats(
    admin: AdminMiddleware,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let rows = state.store.order_stats().await?;
    tracing::info!(categories = rows.len(), "Order stats retrieved");
    Ok(HttpResponse::Ok().json(rows))
}
