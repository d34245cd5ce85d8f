// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Every repository/session/store failure is translated into one of these
/// before it reaches the transport layer; nothing propagates as an unhandled
/// fault. Response bodies are `{"error": <message>}` with an optional
/// `"details"` field carrying upstream diagnostics.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),

    // 401 Unauthorized (missing, invalid, or expired token)
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 500 Internal Server Error
    ConfigMissing(String),
    Upstream { message: String, details: Option<String> },
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ConfigMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::ConfigMissing(msg) => msg,
            ApiError::Upstream { message, .. } => message,
            ApiError::Internal(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Upstream { message, details: Some(details) } => {
                json!({ "error": message, "details": details })
            }
            _ => json!({ "error": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn config_missing(message: impl Into<String>) -> Self {
        ApiError::ConfigMissing(message.into())
    }

    pub fn upstream(message: impl Into<String>, details: Option<String>) -> Self {
        ApiError::Upstream { message: message.into(), details }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::Upstream { status, body } => {
                tracing::error!(status, %body, "store request rejected");
                ApiError::upstream("Store request failed", Some(format!("{status}: {body}")))
            }
            crate::store::StoreError::Http(err) => {
                tracing::error!(%err, "store unreachable");
                ApiError::upstream("Store request failed", Some(err.to_string()))
            }
            crate::store::StoreError::BadResponse(msg) => {
                tracing::error!(%msg, "store returned malformed response");
                ApiError::upstream("Store request failed", Some(msg))
            }
        }
    }
}

impl From<crate::session::SessionError> for ApiError {
    fn from(err: crate::session::SessionError) -> Self {
        match err {
            crate::session::SessionError::Invalid => {
                ApiError::unauthorized("Invalid or expired session")
            }
            crate::session::SessionError::Expired => ApiError::unauthorized("Session expired"),
            crate::session::SessionError::Store(err) => err.into(),
            crate::session::SessionError::Corrupt(msg) => {
                tracing::error!(%msg, "unreadable session record");
                ApiError::internal("Failed to verify session")
            }
        }
    }
}

impl From<crate::repository::RepoError> for ApiError {
    fn from(err: crate::repository::RepoError) -> Self {
        match err {
            crate::repository::RepoError::NotFound(what) => {
                ApiError::not_found(format!("{what} not found"))
            }
            crate::repository::RepoError::Validation(msg) => ApiError::validation(msg),
            crate::repository::RepoError::Store(err) => err.into(),
            crate::repository::RepoError::Serialize(err) => {
                tracing::error!(%err, "entity serialization failed");
                ApiError::internal("Failed to encode record")
            }
        }
    }
}

impl From<crate::config::ConfigError> for ApiError {
    fn from(err: crate::config::ConfigError) -> Self {
        ApiError::config_missing(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
