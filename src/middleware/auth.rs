use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Verified session context for protected handlers.
///
/// Extracting this re-verifies the bearer token against the store on every
/// request; there is no in-process session cache, so a revocation or expiry
/// between two requests is always observed.
#[derive(Clone, Debug)]
pub struct AuthSession {
    pub username: String,
    pub token: String,
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(&parts.headers).ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;
        let username = state.sessions.verify(&token).await?;
        Ok(Self { username, token })
    }
}
