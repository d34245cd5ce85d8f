use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default session lifetime: 24 hours, matching the store-side TTL.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub admin: AdminConfig,
    pub session: SessionConfig,
}

/// Endpoint and credential for the external REST key-value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub token: String,
}

/// Admin credentials come from process configuration, not from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let store = StoreConfig {
            url: require("UPSTASH_REDIS_REST_URL")?,
            token: require("UPSTASH_REDIS_REST_TOKEN")?,
        };

        let admin = AdminConfig {
            username: require("ADMIN_USERNAME")?,
            password: require("ADMIN_PASSWORD")?,
        };

        let ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Ok(Self { store, admin, session: SessionConfig { ttl_secs } })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}
