//! Session issuance, verification, and revocation.
//!
//! Sessions are opaque bearer tokens mapping to JSON records under
//! `session:<token>` in the store. Expiry is tracked twice on purpose: the
//! record's `expiresAt` field is authoritative for application decisions,
//! while the store-side TTL is a cleanup backstop that garbage-collects
//! records nobody verifies again.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{KvStore, StoreError};

/// Token length in bytes before hex encoding.
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No record under the session key.
    #[error("invalid or expired session")]
    Invalid,

    /// Record exists but its `expiresAt` has passed.
    #[error("session expired")]
    Expired,

    /// Store fault. Never treated as a valid session.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Record exists but cannot be parsed.
    #[error("corrupt session record: {0}")]
    Corrupt(String),
}

/// Stored session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KvStore>,
    ttl_secs: u64,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KvStore>, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    /// Issue a session for `username` and return the opaque token.
    ///
    /// One store write: the record goes in under `session:<token>` with a
    /// store-side TTL equal to the session lifetime.
    pub async fn issue(&self, username: &str) -> Result<String, SessionError> {
        let token = generate_token();
        let now = Utc::now();
        let session = Session {
            username: username.to_string(),
            created_at: now,
            expires_at: now + Duration::seconds(self.ttl_secs as i64),
        };

        let json = serde_json::to_string(&session)
            .map_err(|e| SessionError::Corrupt(e.to_string()))?;
        self.store.set_ex(&session_key(&token), &json, self.ttl_secs).await?;

        tracing::info!(username, "session issued");
        Ok(token)
    }

    /// Validate `token` and return the session's username.
    ///
    /// Checks run in order: key present in the store, then `expiresAt` in the
    /// future. A record past its `expiresAt` is deleted best-effort so the
    /// next verify takes the key-absent path; a failed delete only logs.
    pub async fn verify(&self, token: &str) -> Result<String, SessionError> {
        let key = session_key(token);

        let raw = self.store.get(&key).await?.ok_or(SessionError::Invalid)?;
        let session: Session =
            serde_json::from_str(&raw).map_err(|e| SessionError::Corrupt(e.to_string()))?;

        if session.expires_at <= Utc::now() {
            if let Err(err) = self.store.del(&key).await {
                tracing::warn!(%err, "failed to delete expired session");
            }
            return Err(SessionError::Expired);
        }

        Ok(session.username)
    }

    /// Delete the session unconditionally. Idempotent.
    pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        self.store.del(&session_key(token)).await?;
        Ok(())
    }
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

/// 32 random bytes, hex-encoded: 256 bits of entropy per token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(TOKEN_BYTES * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
