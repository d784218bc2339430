use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, ApiError};

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    /// Id of the connection being edited, if any
    #[serde(default)]
    pub connection_id: Option<i64>,
}

pub async fn list_connections(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Connection>>, ApiError> {
    let connections = state.store.list_connections().await?;
    Ok(Json(connections))
}

pub async fn get_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Connection>, ApiError> {
    let connection = state
        .store
        .get_connection(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Connection"))?;
    Ok(Json(connection))
}

pub async fn create_connection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConnectionRequest>,
) -> Result<(StatusCode, Json<Connection>), ApiError> {
    let connection = state.store.create_connection(&req).await?;
    Ok(created(connection))
}

/// Replace a connection's endpoints and hops in one step
pub async fn update_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ConnectionRequest>,
) -> Result<Json<Connection>, ApiError> {
    let connection = state.store.update_connection(id, &req).await?;
    Ok(Json(connection))
}

pub async fn delete_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_connection(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check a proposed connection without saving it; returns the canonical form
pub async fn validate_connection(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ValidateQuery>,
    Json(req): Json<ConnectionRequest>,
) -> Result<Json<CanonicalConnection>, ApiError> {
    let canonical = state.store.validate_connection(&req, query.connection_id).await?;
    Ok(Json(canonical))
}
