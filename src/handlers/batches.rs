use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PagedResult,
};
use crate::{
    entities::batch::BatchStatus,
    errors::ApiError,
    handlers::AppState,
    services::{
        batches::{BatchFilter, CreateBatchInput, UpdateBatchInput},
        movements::{resolve_limit, RecordMovementInput},
        usage::RecordUsageInput,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBatchRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub process_id: Uuid,
    pub bom_template_id: Option<Uuid>,
    pub status: Option<BatchStatus>,
    pub planned_quantity: Option<Decimal>,
    pub input_quantity: Option<Decimal>,
    pub supervisor_id: Option<Uuid>,
    pub created_by: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBatchRequest {
    pub status: Option<BatchStatus>,
    pub planned_quantity: Option<Decimal>,
    pub input_quantity: Option<Decimal>,
    pub output_quantity: Option<Decimal>,
    pub wastage_percentage: Option<Decimal>,
    pub supervisor_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListBatchesQuery {
    /// Single value or comma-separated set; unknown values are dropped
    pub status: Option<String>,
    pub process_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u64>,
    /// Page size; anything outside 1..=100 falls back to the default
    pub limit: Option<u64>,
}

/// Parses the comma-separated status filter, silently dropping
/// unrecognized values.
fn parse_status_filter(raw: Option<&str>) -> Vec<BatchStatus> {
    raw.map(|s| s.split(',').filter_map(BatchStatus::parse).collect())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordMovementRequest {
    pub from_process_id: Option<Uuid>,
    pub to_process_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordUsageRequest {
    pub item_id: Uuid,
    pub actual_quantity: Decimal,
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    pub expected_quantity: Option<Decimal>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessMovementsQuery {
    pub process_id: Uuid,
    pub limit: Option<u64>,
}

async fn create_batch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let batch = state
        .services
        .batches
        .create_batch(CreateBatchInput {
            code: payload.code,
            process_id: payload.process_id,
            bom_template_id: payload.bom_template_id,
            status: payload.status,
            planned_quantity: payload.planned_quantity,
            input_quantity: payload.input_quantity,
            supervisor_id: payload.supervisor_id,
            created_by: payload.created_by,
            notes: payload.notes,
        })
        .await
        .map_err(map_service_error)?;

    info!(batch_id = %batch.batch.id, code = %batch.batch.code, "Batch created");
    Ok(created_response(batch))
}

async fn get_batch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let batch = state
        .services
        .batches
        .get_batch(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(batch))
}

async fn list_batches(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBatchesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = resolve_limit(query.limit);

    let (batches, total) = state
        .services
        .batches
        .list_batches(
            BatchFilter {
                statuses: parse_status_filter(query.status.as_deref()),
                process_id: query.process_id,
                search: query.search,
            },
            page,
            query.limit,
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PagedResult::new(batches, page, limit, total)))
}

async fn update_batch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let batch = state
        .services
        .batches
        .update_batch(
            id,
            UpdateBatchInput {
                status: payload.status,
                planned_quantity: payload.planned_quantity,
                input_quantity: payload.input_quantity,
                output_quantity: payload.output_quantity,
                wastage_percentage: payload.wastage_percentage,
                supervisor_id: payload.supervisor_id,
                notes: payload.notes,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(batch_id = %id, "Batch updated");
    Ok(success_response(batch))
}

async fn delete_batch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .batches
        .delete_batch(id)
        .await
        .map_err(map_service_error)?;

    info!(batch_id = %id, "Batch deleted");
    Ok(no_content_response())
}

async fn batch_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let metrics = state
        .services
        .batches
        .metrics()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(metrics))
}

async fn record_movement(
    State(state): State<Arc<AppState>>,
    Path(batch_id): Path<Uuid>,
    Json(payload): Json<RecordMovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let movement = state
        .services
        .movements
        .record_movement(
            batch_id,
            RecordMovementInput {
                from_process_id: payload.from_process_id,
                to_process_id: payload.to_process_id,
                quantity: payload.quantity,
                occurred_at: payload.occurred_at,
                notes: payload.notes,
                recorded_by: payload.recorded_by,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(%batch_id, movement_id = %movement.id, "Movement recorded");
    Ok(created_response(movement))
}

async fn list_batch_movements(
    State(state): State<Arc<AppState>>,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = state
        .services
        .movements
        .list_for_batch(batch_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(movements))
}

/// Cross-batch movement feed for one process (origin or destination).
async fn list_process_movements(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProcessMovementsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = state
        .services
        .movements
        .list_for_process(query.process_id, query.limit)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(movements))
}

async fn record_usage(
    State(state): State<Arc<AppState>>,
    Path(batch_id): Path<Uuid>,
    Json(payload): Json<RecordUsageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let usage = state
        .services
        .usage
        .record_usage(
            batch_id,
            RecordUsageInput {
                item_id: payload.item_id,
                actual_quantity: payload.actual_quantity,
                unit: payload.unit,
                expected_quantity: payload.expected_quantity,
                notes: payload.notes,
                recorded_by: payload.recorded_by,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(%batch_id, usage_id = %usage.id, "Usage recorded");
    Ok(created_response(usage))
}

async fn list_batch_usage(
    State(state): State<Arc<AppState>>,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let usage = state
        .services
        .usage
        .list_for_batch(batch_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(usage))
}

pub fn batch_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_batch))
        .route("/", get(list_batches))
        .route("/metrics", get(batch_metrics))
        .route("/:id", get(get_batch))
        .route("/:id", put(update_batch))
        .route("/:id", delete(delete_batch))
        .route("/:id/movements", post(record_movement))
        .route("/:id/movements", get(list_batch_movements))
        .route("/:id/usage", post(record_usage))
        .route("/:id/usage", get(list_batch_usage))
}

/// Top-level `/movements?process_id=...` feed, mounted beside the
/// batch routes.
pub fn movement_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_process_movements))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_drops_unknown_values() {
        let parsed = parse_status_filter(Some("scheduled,bogus,in_progress"));
        assert_eq!(
            parsed,
            vec![BatchStatus::Scheduled, BatchStatus::InProgress]
        );
    }

    #[test]
    fn status_filter_handles_absent_and_empty() {
        assert!(parse_status_filter(None).is_empty());
        assert!(parse_status_filter(Some("")).is_empty());
        assert!(parse_status_filter(Some("nope")).is_empty());
    }

    #[test]
    fn status_filter_single_value() {
        assert_eq!(
            parse_status_filter(Some("completed")),
            vec![BatchStatus::Completed]
        );
    }
}
