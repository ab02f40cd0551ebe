use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PagedResult,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::{
        bom_templates::{
            BomTemplateFilter, ComponentInput, CreateBomTemplateInput, UpdateBomTemplateInput,
        },
        movements::resolve_limit,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
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
pub struct ComponentRequest {
    pub item_id: Uuid,
    pub expected_quantity: Decimal,
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    pub position: Option<i32>,
}

impl From<ComponentRequest> for ComponentInput {
    fn from(req: ComponentRequest) -> Self {
        ComponentInput {
            item_id: req.item_id,
            expected_quantity: req.expected_quantity,
            unit: req.unit,
            position: req.position,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBomTemplateRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub process_id: Uuid,
    pub output_item_id: Option<Uuid>,
    pub output_quantity: Option<Decimal>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBomTemplateRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub output_item_id: Option<Uuid>,
    pub output_quantity: Option<Decimal>,
    pub instructions: Option<String>,
    pub is_active: Option<bool>,
    /// Present means full replace of the stored component set
    pub components: Option<Vec<ComponentRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct ListBomTemplatesQuery {
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u64>,
    /// Page size; anything outside 1..=100 falls back to the default
    pub limit: Option<u64>,
}

async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBomTemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let detail = state
        .services
        .bom_templates
        .create_template(CreateBomTemplateInput {
            code: payload.code,
            name: payload.name,
            process_id: payload.process_id,
            output_item_id: payload.output_item_id,
            output_quantity: payload.output_quantity,
            instructions: payload.instructions,
            components: payload.components.into_iter().map(Into::into).collect(),
        })
        .await
        .map_err(map_service_error)?;

    info!(template_id = %detail.template.id, "BOM template created");
    Ok(created_response(detail))
}

async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .bom_templates
        .get_template(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

async fn list_templates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBomTemplatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = resolve_limit(query.limit);
    let (templates, total) = state
        .services
        .bom_templates
        .list_templates(
            BomTemplateFilter {
                is_active: query.is_active,
                search: query.search,
            },
            page,
            query.limit,
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PagedResult::new(templates, page, limit, total)))
}

async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBomTemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let detail = state
        .services
        .bom_templates
        .update_template(
            id,
            UpdateBomTemplateInput {
                name: payload.name,
                output_item_id: payload.output_item_id,
                output_quantity: payload.output_quantity,
                instructions: payload.instructions,
                is_active: payload.is_active,
                components: payload
                    .components
                    .map(|c| c.into_iter().map(Into::into).collect()),
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(template_id = %id, "BOM template updated");
    Ok(success_response(detail))
}

/// Hard delete; 409 when a batch still references the template.
async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .bom_templates
        .delete_template(id)
        .await
        .map_err(map_service_error)?;

    info!(template_id = %id, "BOM template deleted");
    Ok(no_content_response())
}

pub fn bom_template_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_template))
        .route("/", get(list_templates))
        .route("/:id", get(get_template))
        .route("/:id", put(update_template))
        .route("/:id", delete(delete_template))
}
