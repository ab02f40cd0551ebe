use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::job_cards::{ConfirmationDetails, CreateJobCardInput, PendingTransition},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateJobCardRequest {
    #[validate(length(min = 1, max = 255))]
    pub output_item: String,
    pub quantity: Option<Decimal>,
    #[validate(length(min = 1, max = 255))]
    pub current_stage: String,
    pub next_action: Option<String>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdvanceStatusRequest {
    /// +1 moves forward, -1 moves back
    pub direction: i8,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConfirmStatusRequest {
    pub transition: PendingTransition,
    pub weight_in: Option<Decimal>,
    pub weight_out: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RerouteRequest {
    #[validate(length(min = 1, max = 255))]
    pub to_process: String,
    pub weight_in: Option<Decimal>,
    pub weight_out: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductionEntryRequest {
    pub weight_in: Option<Decimal>,
    pub weight_out: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddRequirementRequest {
    #[validate(length(min = 1, max = 255))]
    pub requirement: String,
}

async fn create_card(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateJobCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let card = state
        .services
        .job_cards
        .create_card(CreateJobCardInput {
            output_item: payload.output_item,
            quantity: payload.quantity,
            current_stage: payload.current_stage,
            next_action: payload.next_action,
            instructions: payload.instructions,
            requirements: payload.requirements,
        })
        .await
        .map_err(map_service_error)?;

    info!(card_id = %card.id, "Job card created");
    Ok(created_response(card))
}

async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .services
        .job_cards
        .get_card(id)
        .map_err(map_service_error)?;
    Ok(success_response(card))
}

async fn list_cards(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.job_cards.list_cards()))
}

/// Requests a one-step status move. A boundary no-op returns
/// `{ "data": null }`; otherwise the pending transition to confirm.
async fn advance_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvanceStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pending = state
        .services
        .job_cards
        .advance_status(id, payload.direction)
        .map_err(map_service_error)?;
    Ok(success_response(pending))
}

async fn confirm_status(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConfirmStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .services
        .job_cards
        .confirm_status_change(
            payload.transition,
            ConfirmationDetails {
                weight_in: payload.weight_in,
                weight_out: payload.weight_out,
                notes: payload.notes,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(card_id = %card.id, status = %card.status, "Job card status confirmed");
    Ok(success_response(card))
}

async fn reroute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RerouteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let card = state
        .services
        .job_cards
        .record_reroute(
            id,
            payload.to_process,
            ConfirmationDetails {
                weight_in: payload.weight_in,
                weight_out: payload.weight_out,
                notes: payload.notes,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(card_id = %id, stage = %card.current_stage, "Job card rerouted");
    Ok(success_response(card))
}

async fn production_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductionEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .services
        .job_cards
        .record_production_entry(
            id,
            ConfirmationDetails {
                weight_in: payload.weight_in,
                weight_out: payload.weight_out,
                notes: payload.notes,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(card_id = %id, "Production entry recorded");
    Ok(success_response(card))
}

async fn add_requirement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddRequirementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let card = state
        .services
        .job_cards
        .add_requirement(id, payload.requirement)
        .map_err(map_service_error)?;
    Ok(success_response(card))
}

async fn remove_requirement(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .services
        .job_cards
        .remove_requirement(id, index)
        .map_err(map_service_error)?;
    Ok(success_response(card))
}

pub fn job_card_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_card))
        .route("/", get(list_cards))
        .route("/:id", get(get_card))
        .route("/:id/advance", post(advance_status))
        .route("/confirm", post(confirm_status))
        .route("/:id/reroute", post(reroute))
        .route("/:id/production", post(production_entry))
        .route("/:id/requirements", post(add_requirement))
        .route("/:id/requirements/:index", delete(remove_requirement))
}
