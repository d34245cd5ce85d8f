//! Tenant CRUD. Same shape as apartments, plus the cross-reference: every
//! write resolves `apartmentName` against the apartment list first.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::object;
use crate::error::ApiError;
use crate::middleware::auth::AuthSession;
use crate::models::Tenant;
use crate::repository::ListRepository;
use crate::state::AppState;

fn repo(state: &AppState) -> ListRepository<Tenant> {
    ListRepository::new(state.store.clone())
}

/// GET /tenants
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Tenant>>, ApiError> {
    Ok(Json(repo(&state).list().await?))
}

/// GET /tenants/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    Ok(Json(repo(&state).get(&id).await?))
}

/// POST /tenants
pub async fn create(
    State(state): State<AppState>,
    session: AuthSession,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Tenant>), ApiError> {
    let tenant = repo(&state).create(object(body)?).await?;
    tracing::info!(user = %session.username, id = %tenant.id, "tenant created");
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// PUT /tenants/:id
pub async fn update(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Tenant>, ApiError> {
    let tenant = repo(&state).update(&id, object(body)?).await?;
    tracing::info!(user = %session.username, id = %tenant.id, "tenant updated");
    Ok(Json(tenant))
}

/// DELETE /tenants/:id
pub async fn delete(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    repo(&state).delete(&id).await?;
    tracing::info!(user = %session.username, id = %id, "tenant deleted");
    Ok(Json(json!({ "message": "Tenant deleted successfully" })))
}
