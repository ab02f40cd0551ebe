use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "milltrack-api",
        description = "Production tracking for a yarn/textile manufacturing floor: \
                       master data, BOM templates, batches, movement/usage ledgers \
                       and job card workflow."
    ),
    components(schemas(
        crate::entities::item::ItemStatus,
        crate::entities::uom::UomType,
        crate::entities::worker::WorkerStatus,
        crate::entities::batch::BatchStatus,
        crate::handlers::processes::CreateProcessRequest,
        crate::handlers::processes::UpdateProcessRequest,
        crate::handlers::items::CreateItemRequest,
        crate::handlers::items::UpdateItemRequest,
        crate::handlers::uoms::CreateUomRequest,
        crate::handlers::uoms::UpdateUomRequest,
        crate::handlers::workers::CreateWorkerRequest,
        crate::handlers::workers::UpdateWorkerRequest,
        crate::handlers::bom_templates::ComponentRequest,
        crate::handlers::bom_templates::CreateBomTemplateRequest,
        crate::handlers::bom_templates::UpdateBomTemplateRequest,
        crate::handlers::batches::CreateBatchRequest,
        crate::handlers::batches::UpdateBatchRequest,
        crate::handlers::batches::RecordMovementRequest,
        crate::handlers::batches::RecordUsageRequest,
        crate::handlers::job_cards::CreateJobCardRequest,
        crate::handlers::job_cards::AdvanceStatusRequest,
        crate::handlers::job_cards::ConfirmStatusRequest,
        crate::handlers::job_cards::RerouteRequest,
        crate::handlers::job_cards::ProductionEntryRequest,
        crate::handlers::job_cards::AddRequirementRequest,
        crate::services::job_cards::JobCard,
        crate::services::job_cards::JobCardStatus,
        crate::services::job_cards::JobCardTransaction,
        crate::services::job_cards::PendingTransition,
        crate::services::job_cards::ConfirmationDetails,
        crate::services::job_cards::TransactionType,
    ))
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, spec at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
