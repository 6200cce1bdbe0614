//! HTTP handlers and route table for the bistro backend API.

pub mod admin;
pub mod carts;
pub mod health;
pub mod jwt;
pub mod menu;
pub mod payments;
pub mod reviews;
pub mod users;

use actix_web::web;

/// Registers every route of the API.
///
/// # Route Structure
/// ```text
/// GET    /                        liveness banner
/// GET    /menu                    list menu
/// POST   /menu/addItem            insert menu item          token + admin
/// GET    /menu/{id}               get menu item
/// PATCH  /menu/{id}               update menu item
/// DELETE /menu/{id}               delete menu item          token + admin
/// GET    /reviews                 list reviews
/// GET    /carts?email=            list carts by owner
/// POST   /carts                   insert cart item
/// DELETE /carts/{id}              delete cart item
/// POST   /create-payment-intent   provider client secret
/// POST   /payments                checkout
/// GET    /paymentHistory/{email}  caller's payments         token, self only
/// POST   /jwt                     issue bearer token
/// GET    /users                   list users                token + admin
/// POST   /users                   insert user if new
/// GET    /users/admin/{email}     {admin: bool}             token, self only
/// PATCH  /users/admin/{id}        promote to admin          token + admin
/// DELETE /users/{id}              delete user               token + admin
/// GET    /admin-stats             summary stats             token + admin
/// GET    /order-stats             per-category stats        token + admin
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::root))
        // Menu
        .service(web::resource("/menu").route(web::get().to(menu::list_menu)))
        .service(web::resource("/menu/addItem").route(web::post().to(menu::add_item)))
        .service(
            web::resource("/menu/{id}")
                .route(web::get().to(menu::get_item))
                .route(web::patch().to(menu::update_item))
                .route(web::delete().to(menu::delete_item)),
        )
        // Reviews
        .route("/reviews", web::get().to(reviews::list_reviews))
        // Carts
        .service(
            web::resource("/carts")
                .route(web::get().to(carts::list_carts))
                .route(web::post().to(carts::add_to_cart)),
        )
        .route("/carts/{id}", web::delete().to(carts::delete_cart_item))
        // Payments
        .route(
            "/create-payment-intent",
            web::post().to(payments::create_payment_intent),
        )
        .route("/payments", web::post().to(payments::checkout))
        .route(
            "/paymentHistory/{email}",
            web::get().to(payments::payment_history),
        )
        // Tokens
        .route("/jwt", web::post().to(jwt::issue_token))
        // Users
        .service(
            web::resource("/users")
                .route(web::get().to(users::list_users))
                .route(web::post().to(users::create_user)),
        )
        .service(
            web::resource("/users/admin/{key}")
                .route(web::get().to(users::admin_status))
                .route(web::patch().to(users::make_admin)),
        )
        .route("/users/{id}", web::delete().to(users::delete_user))
        // Stats
        .route("/admin-stats", web::get().to(admin::stats::admin_stats))
        .route("/order-stats", web::get().to(admin::stats::order_stats));
}
