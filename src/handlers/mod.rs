pub mod connections;
pub mod devices;
pub mod locations;
pub mod racks;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::topology::TopologyError;

/// Error response: `{"error": "message", "kind": "port_conflict"}`
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: Option<&'static str>,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: None,
            message: msg.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: None,
            message: format!("{} not found", resource),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            kind: None,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: None,
            message: msg.into(),
        }
    }

    /// Map a rule violation to its status code. Conflicts with existing data
    /// are 409; bad references are 422; malformed or out-of-bounds input is 400.
    pub fn topology(err: &TopologyError) -> Self {
        let status = match err {
            TopologyError::Structural(_) | TopologyError::OutOfRange { .. } => StatusCode::BAD_REQUEST,
            TopologyError::Referential(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TopologyError::OverlapConflict { .. }
            | TopologyError::PortConflict { .. }
            | TopologyError::IneligiblePc { .. } => StatusCode::CONFLICT,
        };
        Self {
            status,
            kind: Some(err.kind()),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                kind: self.kind,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Typed errors first
        if let Some(nf) = err.downcast_ref::<crate::db::NotFoundError>() {
            return Self {
                status: StatusCode::NOT_FOUND,
                kind: None,
                message: nf.to_string(),
            };
        }
        if let Some(conflict) = err.downcast_ref::<crate::db::ConflictError>() {
            return Self::conflict(conflict.to_string());
        }
        if let Some(rule) = err.downcast_ref::<TopologyError>() {
            return Self::topology(rule);
        }
        tracing::error!("Request failed: {:#}", err);
        Self::internal(err.to_string())
    }
}

/// Response helper: return 201 Created with JSON body
pub fn created<T: Serialize>(item: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(item))
}

/// Healthcheck endpoint, returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "netdoc",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_errors_map_to_status_codes() {
        let cases = [
            (TopologyError::Structural("x".into()), StatusCode::BAD_REQUEST),
            (
                TopologyError::OutOfRange {
                    subject: "port".into(),
                    value: 30,
                    min: 1,
                    max: Some(24),
                },
                StatusCode::BAD_REQUEST,
            ),
            (TopologyError::Referential("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                TopologyError::OverlapConflict {
                    rack_id: 1,
                    start: 11,
                    end: 11,
                    conflicting: vec![10],
                },
                StatusCode::CONFLICT,
            ),
            (
                TopologyError::PortConflict {
                    device_id: 10,
                    device_name: "SW1".into(),
                    port: "Gi0/1".into(),
                    connection_id: 1,
                },
                StatusCode::CONFLICT,
            ),
            (
                TopologyError::IneligiblePc {
                    pc_id: 1,
                    pc_name: "PC1".into(),
                    connection_id: 1,
                },
                StatusCode::CONFLICT,
            ),
        ];

        for (err, status) in cases {
            let api: ApiError = anyhow::Error::new(err.clone()).into();
            assert_eq!(api.status, status, "{:?}", err);
            assert_eq!(api.kind, Some(err.kind()));
        }
    }

    #[test]
    fn test_store_errors_map_to_status_codes() {
        let api: ApiError = anyhow::Error::new(crate::db::NotFoundError::new("Rack", "7")).into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);

        let api: ApiError = anyhow::Error::new(crate::db::ConflictError::new("in use")).into();
        assert_eq!(api.status, StatusCode::CONFLICT);

        let api: ApiError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
