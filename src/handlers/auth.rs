//! Admin authentication endpoints.
//!
//! Credentials are checked against process configuration; sessions live in
//! the store (see [`crate::session`]).

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::{bearer_token, AuthSession};
use crate::state::AppState;

/// POST /auth/login - exchange admin credentials for a session token.
///
/// Missing fields are a 400, a credential mismatch a 401. Success returns
/// `{token, message}` with the opaque bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let username = body.get("username").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let admin = &state.config.admin;
    if username != admin.username || password != admin.password {
        tracing::warn!(username, "rejected login attempt");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.sessions.issue(username).await?;
    Ok(Json(json!({ "token": token, "message": "Login successful" })))
}

/// POST /auth/logout - revoke the presented session.
///
/// Requires a bearer header but not a *valid* session: revoking an already
/// dead token still succeeds.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;
    state.sessions.revoke(&token).await?;
    Ok(Json(json!({ "message": "Logout successful" })))
}

/// GET /auth/verify - report whether the presented session is valid.
pub async fn verify(session: AuthSession) -> Json<Value> {
    Json(json!({ "valid": true, "username": session.username }))
}
