//! Process configuration read from the environment.
//!
//! `main` loads `.env` through `dotenv` first, so every variable can also live
//! in a local `.env` file during development.

use std::{env, net::IpAddr};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is not valid: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub access_token_secret: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub mailgun_api_key: String,
    pub mailgun_domain: String,
    pub mailgun_api_base: String,
    pub mail_from: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let host = parse("HOST", optional("HOST", "127.0.0.1"))?;
        let port = parse("PORT", optional("PORT", "5000"))?;
        let db_max_connections = parse("DB_MAX_CONNECTIONS", optional("DB_MAX_CONNECTIONS", "5"))?;

        let mailgun_domain = required("MAIL_SENDING_DOMAIN")?;
        let mail_from = optional(
            "MAIL_FROM",
            &format!("Bistro Boss <mailgun@{mailgun_domain}>"),
        );

        Ok(Self {
            host,
            port,
            database_url: required("DATABASE_URL")?,
            db_max_connections,
            access_token_secret: required("ACCESS_TOKEN_SECRET")?,
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_api_base: optional("STRIPE_API_BASE", "https://api.stripe.com"),
            mailgun_api_key: required("MAIL_GUN_API_KEY")?,
            mailgun_domain,
            mailgun_api_base: optional("MAILGUN_API_BASE", "https://api.mailgun.net"),
            mail_from,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
