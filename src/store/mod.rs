//! Client for the external REST key-value store.
//!
//! The store holds one JSON blob per key and is trusted as an atomic-per-key
//! blob store: it owns durability and TTL enforcement. This module only
//! speaks the wire protocol; parsing the stored JSON is the caller's job.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StoreConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Store answered with a non-success status; `body` carries its diagnostic.
    #[error("store returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("unexpected store response: {0}")]
    BadResponse(String),
}

/// Minimal GET/SET/DEL surface over the key-value store.
///
/// A trait seam so handlers and tests can run against [`memory::MemoryStore`]
/// while deployments use [`RestStore`].
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value under `key`; `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write `value` under `key` with a store-side TTL.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a non-existent key is not an error.
    async fn del(&self, key: &str) -> Result<(), StoreError>;
}

/// Wire shape of `GET <base>/get/<key>`: the stored text, or null.
#[derive(Debug, Deserialize)]
struct GetResponse {
    result: Option<String>,
}

/// Envelope for TTL'd writes: `POST <base>/set/<key>` with `{ex, value}`.
#[derive(Debug, Serialize)]
struct SetWithExpiry<'a> {
    ex: u64,
    value: &'a str,
}

/// HTTP client for an Upstash-style REST key-value service.
///
/// Every request carries the configured bearer credential. Values are stored
/// with exactly one level of JSON encoding: `set` sends the JSON text as the
/// request body and `get` returns that same text for the caller to parse.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Upstream { status: status.as_u16(), body })
    }
}

#[async_trait]
impl KvStore for RestStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let response = self
            .client
            .get(format!("{}/get/{}", self.base_url, key))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let parsed: GetResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::BadResponse(e.to_string()))?;

        Ok(parsed.result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!("{}/set/{}", self.base_url, key))
            .bearer_auth(&self.token)
            .body(value.to_string())
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!("{}/set/{}", self.base_url, key))
            .bearer_auth(&self.token)
            .json(&SetWithExpiry { ex: ttl_secs, value })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!("{}/del/{}", self.base_url, key))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
