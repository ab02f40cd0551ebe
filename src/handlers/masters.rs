use super::common::{created_response, map_service_error, validate_input};
use crate::{
    errors::ApiError,
    handlers::{
        bom_templates::CreateBomTemplateRequest, items::CreateItemRequest,
        processes::CreateProcessRequest, uoms::CreateUomRequest, workers::CreateWorkerRequest,
        AppState,
    },
    services::{
        bom_templates::CreateBomTemplateInput,
        items::CreateItemInput,
        processes::CreateProcessInput,
        uoms::CreateUomInput,
        workers::CreateWorkerInput,
    },
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Closed set of master-data kinds the generic create dialog can
/// submit. Dispatch is by tag, never by sniffing optional fields.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateMasterRequest {
    Item(CreateItemRequest),
    Process(CreateProcessRequest),
    Uom(CreateUomRequest),
    Worker(CreateWorkerRequest),
    BomTemplate(CreateBomTemplateRequest),
}

async fn create_master(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateMasterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    match payload {
        CreateMasterRequest::Item(req) => {
            validate_input(&req)?;
            let item = state
                .services
                .items
                .create_item(CreateItemInput {
                    sku: req.sku,
                    name: req.name,
                    category: req.category,
                    unit: req.unit,
                    unit_cost: req.unit_cost,
                    reorder_level: req.reorder_level,
                    vendor: req.vendor,
                    notes: req.notes,
                })
                .await
                .map_err(map_service_error)?;
            info!(item_id = %item.id, "Item created via masters dispatch");
            Ok(created_response(item))
        }
        CreateMasterRequest::Process(req) => {
            validate_input(&req)?;
            let process = state
                .services
                .processes
                .create_process(CreateProcessInput {
                    slug: req.slug,
                    name: req.name,
                    description: req.description,
                    sequence: req.sequence,
                })
                .await
                .map_err(map_service_error)?;
            info!(process_id = %process.id, "Process created via masters dispatch");
            Ok(created_response(process))
        }
        CreateMasterRequest::Uom(req) => {
            validate_input(&req)?;
            let uom = state
                .services
                .uoms
                .create_uom(CreateUomInput {
                    code: req.code,
                    name: req.name,
                    uom_type: req.uom_type,
                    precision: req.precision,
                })
                .await
                .map_err(map_service_error)?;
            info!(uom_id = %uom.id, "UOM created via masters dispatch");
            Ok(created_response(uom))
        }
        CreateMasterRequest::Worker(req) => {
            validate_input(&req)?;
            let worker = state
                .services
                .workers
                .create_worker(CreateWorkerInput {
                    code: req.code,
                    display_name: req.display_name,
                    role: req.role,
                    department: req.department,
                    shift: req.shift,
                    contact: req.contact,
                    skills: req.skills,
                })
                .await
                .map_err(map_service_error)?;
            info!(worker_id = %worker.id, "Worker created via masters dispatch");
            Ok(created_response(worker))
        }
        CreateMasterRequest::BomTemplate(req) => {
            validate_input(&req)?;
            let detail = state
                .services
                .bom_templates
                .create_template(CreateBomTemplateInput {
                    code: req.code,
                    name: req.name,
                    process_id: req.process_id,
                    output_item_id: req.output_item_id,
                    output_quantity: req.output_quantity,
                    instructions: req.instructions,
                    components: req.components.into_iter().map(Into::into).collect(),
                })
                .await
                .map_err(map_service_error)?;
            info!(template_id = %detail.template.id, "BOM template created via masters dispatch");
            Ok(created_response(detail))
        }
    }
}

pub fn masters_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(create_master))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_tag_selects_the_payload_kind() {
        let raw = serde_json::json!({
            "kind": "uom",
            "code": "KG",
            "name": "Kilogram",
            "type": "weight",
            "precision": 3
        });
        let parsed: CreateMasterRequest = serde_json::from_value(raw).unwrap();
        assert!(matches!(parsed, CreateMasterRequest::Uom(_)));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = serde_json::json!({ "kind": "warehouse", "name": "x" });
        assert!(serde_json::from_value::<CreateMasterRequest>(raw).is_err());
    }
}
