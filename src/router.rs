use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>, frontend_dir: &str) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Location routes
        .route(
            "/api/locations",
            get(handlers::locations::list_locations).post(handlers::locations::create_location),
        )
        .route(
            "/api/locations/:id",
            get(handlers::locations::get_location)
                .put(handlers::locations::update_location)
                .delete(handlers::locations::delete_location),
        )
        // Rack routes
        .route(
            "/api/racks",
            get(handlers::racks::list_racks).post(handlers::racks::create_rack),
        )
        .route(
            "/api/racks/:id",
            get(handlers::racks::get_rack)
                .put(handlers::racks::update_rack)
                .delete(handlers::racks::delete_rack),
        )
        .route("/api/racks/:id/units", get(handlers::racks::get_rack_units))
        // Device routes
        .route(
            "/api/devices",
            get(handlers::devices::list_devices).post(handlers::devices::create_device),
        )
        .route(
            "/api/devices/:id",
            get(handlers::devices::get_device)
                .put(handlers::devices::update_device)
                .delete(handlers::devices::delete_device),
        )
        .route("/api/devices/:id/ports", get(handlers::devices::get_device_ports))
        .route("/api/devices/:id/references", get(handlers::devices::get_device_references))
        .route("/api/available-pcs", get(handlers::devices::list_available_pcs))
        // Connection routes
        .route(
            "/api/connections",
            get(handlers::connections::list_connections).post(handlers::connections::create_connection),
        )
        .route("/api/connections/validate", post(handlers::connections::validate_connection))
        .route(
            "/api/connections/:id",
            get(handlers::connections::get_connection)
                .put(handlers::connections::update_connection)
                .delete(handlers::connections::delete_connection),
        )
        // Static files (frontend)
        .nest_service("/assets", ServeDir::new(format!("{}/assets", frontend_dir)))
        .fallback_service(
            ServeDir::new(frontend_dir).fallback(ServeFile::new(format!("{}/index.html", frontend_dir))),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
