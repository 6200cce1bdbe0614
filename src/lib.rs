//! Library entry point for the bistro backend.
//!
//! Exports all core modules for use in integration tests and by the main binary.

pub mod auth_middleware;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod request_log;
pub mod services;
pub mod store;
pub mod token;

pub use auth_middleware::*;
pub use config::Settings;
pub use error::ApiError;
pub use logging::*;
pub use models::AppState;
pub use request_log::RequestLoggingMiddleware;
