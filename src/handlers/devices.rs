use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::*;
use crate::topology::{DeviceReference, PortOccupancy};
use crate::AppState;

use super::{created, ApiError};

#[derive(Debug, Deserialize)]
pub struct DeviceListQuery {
    #[serde(default)]
    pub kind: Option<DeviceKind>,
}

#[derive(Debug, Deserialize)]
pub struct AvailablePcsQuery {
    #[serde(default)]
    pub excluding_connection_id: Option<i64>,
}

/// List devices, optionally filtered by kind (`pc`, `switch`, `patch_panel`)
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeviceListQuery>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.store.list_devices(query.kind).await?;
    Ok(Json(devices))
}

pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Device>, ApiError> {
    let device = state
        .store
        .get_device(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Device"))?;
    Ok(Json(device))
}

pub async fn create_device(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let device = state.store.create_device(&req).await?;
    Ok(created(device))
}

pub async fn update_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<Json<Device>, ApiError> {
    let device = state.store.update_device(id, &req).await?;
    Ok(Json(device))
}

/// Delete a device; refused while any connection path uses it
pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_device(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Port occupancy of a switch or patch panel
pub async fn get_device_ports(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PortOccupancy>, ApiError> {
    let ports = state.store.device_ports(id).await?;
    Ok(Json(ports))
}

/// Connections that use a device as PC, switch or hop
pub async fn get_device_references(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<DeviceReference>>, ApiError> {
    let refs = state.store.device_references(id).await?;
    Ok(Json(refs))
}

/// PCs that can take another connection
pub async fn list_available_pcs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailablePcsQuery>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let pcs = state.store.available_pcs(query.excluding_connection_id).await?;
    Ok(Json(pcs))
}
