use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    entities::uom::UomType,
    errors::ApiError,
    handlers::AppState,
    services::uoms::{CreateUomInput, UpdateUomInput},
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
pub struct CreateUomRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(rename = "type")]
    pub uom_type: UomType,
    #[validate(range(min = 0, max = 6))]
    pub precision: i16,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUomRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub uom_type: Option<UomType>,
    #[validate(range(min = 0, max = 6))]
    pub precision: Option<i16>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListUomsQuery {
    #[serde(default)]
    pub active_only: bool,
}

async fn create_uom(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let uom = state
        .services
        .uoms
        .create_uom(CreateUomInput {
            code: payload.code,
            name: payload.name,
            uom_type: payload.uom_type,
            precision: payload.precision,
        })
        .await
        .map_err(map_service_error)?;

    info!(uom_id = %uom.id, code = %uom.code, "UOM created");
    Ok(created_response(uom))
}

async fn get_uom(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let uom = state
        .services
        .uoms
        .get_uom(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(uom))
}

async fn list_uoms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListUomsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let uoms = state
        .services
        .uoms
        .list_uoms(query.active_only)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(uoms))
}

async fn update_uom(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let uom = state
        .services
        .uoms
        .update_uom(
            id,
            UpdateUomInput {
                name: payload.name,
                uom_type: payload.uom_type,
                precision: payload.precision,
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(uom_id = %id, "UOM updated");
    Ok(success_response(uom))
}

pub fn uom_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_uom))
        .route("/", get(list_uoms))
        .route("/:id", get(get_uom))
        .route("/:id", put(update_uom))
}
