pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

pub use handlers::AppState;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Full v1 API surface, mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/processes", handlers::processes::process_routes())
        .nest("/items", handlers::items::item_routes())
        .nest("/uoms", handlers::uoms::uom_routes())
        .nest("/workers", handlers::workers::worker_routes())
        .nest("/bom-templates", handlers::bom_templates::bom_template_routes())
        .nest("/batches", handlers::batches::batch_routes())
        .nest("/movements", handlers::batches::movement_routes())
        .nest("/job-cards", handlers::job_cards::job_card_routes())
        .nest("/masters", handlers::masters::masters_routes())
        .route("/status", get(api_status))
}

/// Liveness plus a datastore ping.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok", "database": "up" })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "degraded",
                "database": "down",
                "message": err.response_message(),
            })),
        ),
    }
}

async fn api_status() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
