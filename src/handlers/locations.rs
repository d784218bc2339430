use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, ApiError};

pub async fn list_locations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Location>>, ApiError> {
    let locations = state.store.list_locations().await?;
    Ok(Json(locations))
}

pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Location>, ApiError> {
    let location = state
        .store
        .get_location(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Location"))?;
    Ok(Json(location))
}

pub async fn create_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let location = state.store.create_location(&req).await?;
    Ok(created(location))
}

pub async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateLocationRequest>,
) -> Result<Json<Location>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let location = state.store.update_location(id, &req).await?;
    Ok(Json(location))
}

/// Delete a location; refused while racks or devices belong to it
pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
