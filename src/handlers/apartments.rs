//! Apartment CRUD. Reads are public; mutations require a verified session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::object;
use crate::error::ApiError;
use crate::middleware::auth::AuthSession;
use crate::models::Apartment;
use crate::repository::ListRepository;
use crate::state::AppState;

fn repo(state: &AppState) -> ListRepository<Apartment> {
    ListRepository::new(state.store.clone())
}

/// GET /apartments
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Apartment>>, ApiError> {
    Ok(Json(repo(&state).list().await?))
}

/// GET /apartments/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Apartment>, ApiError> {
    Ok(Json(repo(&state).get(&id).await?))
}

/// POST /apartments
pub async fn create(
    State(state): State<AppState>,
    session: AuthSession,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Apartment>), ApiError> {
    let apartment = repo(&state).create(object(body)?).await?;
    tracing::info!(user = %session.username, id = %apartment.id, "apartment created");
    Ok((StatusCode::CREATED, Json(apartment)))
}

/// PUT /apartments/:id
pub async fn update(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Apartment>, ApiError> {
    let apartment = repo(&state).update(&id, object(body)?).await?;
    tracing::info!(user = %session.username, id = %apartment.id, "apartment updated");
    Ok(Json(apartment))
}

/// DELETE /apartments/:id
pub async fn delete(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    repo(&state).delete(&id).await?;
    tracing::info!(user = %session.username, id = %id, "apartment deleted");
    Ok(Json(json!({ "message": "Apartment deleted successfully" })))
}
