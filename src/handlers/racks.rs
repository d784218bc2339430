use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::*;
use crate::topology::RackUnit;
use crate::AppState;

use super::{created, ApiError};

#[derive(Debug, Deserialize)]
pub struct RackListQuery {
    #[serde(default)]
    pub location_id: Option<i64>,
}

/// List racks, optionally only those at one location
pub async fn list_racks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RackListQuery>,
) -> Result<Json<Vec<Rack>>, ApiError> {
    let racks = state.store.list_racks(query.location_id).await?;
    Ok(Json(racks))
}

pub async fn get_rack(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Rack>, ApiError> {
    let rack = state
        .store
        .get_rack(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Rack"))?;
    Ok(Json(rack))
}

pub async fn create_rack(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRackRequest>,
) -> Result<(StatusCode, Json<Rack>), ApiError> {
    let rack = state.store.create_rack(&req).await?;
    Ok(created(rack))
}

/// Update a rack; shrinking below a placed device is rejected
pub async fn update_rack(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateRackRequest>,
) -> Result<Json<Rack>, ApiError> {
    let rack = state.store.update_rack(id, &req).await?;
    Ok(Json(rack))
}

pub async fn delete_rack(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_rack(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unit-by-unit occupancy, highest unit first for bottom-up racks
pub async fn get_rack_units(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RackUnit>>, ApiError> {
    let units = state.store.rack_units(id).await?;
    Ok(Json(units))
}
