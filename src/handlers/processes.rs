use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::processes::{CreateProcessInput, UpdateProcessInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProcessRequest {
    #[validate(length(min = 1, max = 64))]
    pub slug: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub sequence: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProcessRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub sequence: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListProcessesQuery {
    #[serde(default)]
    pub active_only: bool,
}

async fn create_process(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProcessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let process = state
        .services
        .processes
        .create_process(CreateProcessInput {
            slug: payload.slug,
            name: payload.name,
            description: payload.description,
            sequence: payload.sequence,
        })
        .await
        .map_err(map_service_error)?;

    info!(process_id = %process.id, "Process created");
    Ok(created_response(process))
}

async fn get_process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let process = state
        .services
        .processes
        .get_process(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(process))
}

async fn list_processes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProcessesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let processes = state
        .services
        .processes
        .list_processes(query.active_only)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(processes))
}

async fn update_process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProcessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let process = state
        .services
        .processes
        .update_process(
            id,
            UpdateProcessInput {
                name: payload.name,
                description: payload.description,
                sequence: payload.sequence,
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(process_id = %id, "Process updated");
    Ok(success_response(process))
}

async fn deactivate_process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .processes
        .deactivate_process(id)
        .await
        .map_err(map_service_error)?;

    info!(process_id = %id, "Process deactivated");
    Ok(no_content_response())
}

pub fn process_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_process))
        .route("/", get(list_processes))
        .route("/:id", get(get_process))
        .route("/:id", put(update_process))
        .route("/:id/deactivate", post(deactivate_process))
}
