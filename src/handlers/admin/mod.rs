//! Administrator-only functionality.
//!
//! [`guard`] holds the role check every admin route goes through; [`stats`]
//! holds the dashboard aggregations. Admin-gated menu and user routes live
//! with their collections. They take a [`guard::AdminMiddleware`] argument, or
//! call [`guard::admin_guard`] first when they also read a request body.

pub mod guard;
pub mod stats;
