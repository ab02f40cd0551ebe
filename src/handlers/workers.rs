use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    entities::worker::WorkerStatus,
    errors::ApiError,
    handlers::AppState,
    services::workers::{CreateWorkerInput, UpdateWorkerInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkerRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub display_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub shift: Option<String>,
    pub contact: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkerRequest {
    #[validate(length(min = 1, max = 255))]
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub shift: Option<String>,
    pub status: Option<WorkerStatus>,
    pub contact: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListWorkersQuery {
    pub status: Option<WorkerStatus>,
}

async fn create_worker(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWorkerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let worker = state
        .services
        .workers
        .create_worker(CreateWorkerInput {
            code: payload.code,
            display_name: payload.display_name,
            role: payload.role,
            department: payload.department,
            shift: payload.shift,
            contact: payload.contact,
            skills: payload.skills,
        })
        .await
        .map_err(map_service_error)?;

    info!(worker_id = %worker.id, code = %worker.code, "Worker created");
    Ok(created_response(worker))
}

async fn get_worker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let worker = state
        .services
        .workers
        .get_worker(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(worker))
}

async fn list_workers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListWorkersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let workers = state
        .services
        .workers
        .list_workers(query.status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(workers))
}

async fn update_worker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let worker = state
        .services
        .workers
        .update_worker(
            id,
            UpdateWorkerInput {
                display_name: payload.display_name,
                role: payload.role,
                department: payload.department,
                shift: payload.shift,
                status: payload.status,
                contact: payload.contact,
                skills: payload.skills,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(worker_id = %id, "Worker updated");
    Ok(success_response(worker))
}

async fn assign_process(
    State(state): State<Arc<AppState>>,
    Path((worker_id, process_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .workers
        .assign_to_process(worker_id, process_id)
        .await
        .map_err(map_service_error)?;

    info!(%worker_id, %process_id, "Worker allocated to process");
    Ok(created_response(serde_json::json!({
        "worker_id": worker_id,
        "process_id": process_id,
    })))
}

async fn unassign_process(
    State(state): State<Arc<AppState>>,
    Path((worker_id, process_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .workers
        .unassign_from_process(worker_id, process_id)
        .await
        .map_err(map_service_error)?;

    info!(%worker_id, %process_id, "Worker allocation removed");
    Ok(no_content_response())
}

async fn allocated_processes(
    State(state): State<Arc<AppState>>,
    Path(worker_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processes = state
        .services
        .workers
        .allocated_processes(worker_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(processes))
}

pub fn worker_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_worker))
        .route("/", get(list_workers))
        .route("/:id", get(get_worker))
        .route("/:id", put(update_worker))
        .route("/:id/processes", get(allocated_processes))
        .route("/:id/processes/:process_id", post(assign_process))
        .route("/:id/processes/:process_id", delete(unassign_process))
}
