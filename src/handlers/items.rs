use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    entities::item::ItemStatus,
    errors::ApiError,
    handlers::AppState,
    services::items::{CreateItemInput, ItemFilter, UpdateItemInput},
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
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub category: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub unit: String,
    pub unit_cost: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub status: Option<ItemStatus>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub status: Option<ItemStatus>,
    pub search: Option<String>,
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .items
        .create_item(CreateItemInput {
            sku: payload.sku,
            name: payload.name,
            category: payload.category,
            unit: payload.unit,
            unit_cost: payload.unit_cost,
            reorder_level: payload.reorder_level,
            vendor: payload.vendor,
            notes: payload.notes,
        })
        .await
        .map_err(map_service_error)?;

    info!(item_id = %item.id, sku = %item.sku, "Item created");
    Ok(created_response(item))
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .items
        .get_item(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListItemsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .items
        .list_items(ItemFilter {
            status: query.status,
            search: query.search,
        })
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .items
        .update_item(
            id,
            UpdateItemInput {
                name: payload.name,
                category: payload.category,
                unit: payload.unit,
                unit_cost: payload.unit_cost,
                reorder_level: payload.reorder_level,
                status: payload.status,
                vendor: payload.vendor,
                notes: payload.notes,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!(item_id = %id, "Item updated");
    Ok(success_response(item))
}

/// Hard delete; a 409 here means the item is referenced and should be
/// deactivated instead.
async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .items
        .delete_item(id)
        .await
        .map_err(map_service_error)?;

    info!(item_id = %id, "Item deleted");
    Ok(no_content_response())
}

async fn deactivate_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .items
        .deactivate_item(id)
        .await
        .map_err(map_service_error)?;

    info!(item_id = %id, "Item deactivated");
    Ok(success_response(item))
}

pub fn item_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_item))
        .route("/", get(list_items))
        .route("/:id", get(get_item))
        .route("/:id", put(update_item))
        .route("/:id", delete(delete_item))
        .route("/:id/deactivate", post(deactivate_item))
}
