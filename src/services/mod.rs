pub mod batches;
pub mod bom_templates;
pub mod items;
pub mod job_cards;
pub mod movements;
pub mod processes;
pub mod uoms;
pub mod usage;
pub mod workers;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

/// All services wired against one pool and one event channel; cloned
/// into the router state.
#[derive(Clone)]
pub struct AppServices {
    pub processes: processes::ProcessService,
    pub items: items::ItemService,
    pub uoms: uoms::UomService,
    pub workers: workers::WorkerService,
    pub bom_templates: bom_templates::BomTemplateService,
    pub batches: batches::BatchService,
    pub movements: movements::MovementService,
    pub usage: usage::UsageService,
    pub job_cards: job_cards::JobCardService,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            processes: processes::ProcessService::new(db_pool.clone(), event_sender.clone()),
            items: items::ItemService::new(db_pool.clone(), event_sender.clone()),
            uoms: uoms::UomService::new(db_pool.clone(), event_sender.clone()),
            workers: workers::WorkerService::new(db_pool.clone(), event_sender.clone()),
            bom_templates: bom_templates::BomTemplateService::new(
                db_pool.clone(),
                event_sender.clone(),
            ),
            batches: batches::BatchService::new(db_pool.clone(), event_sender.clone()),
            movements: movements::MovementService::new(db_pool.clone(), event_sender.clone()),
            usage: usage::UsageService::new(db_pool, event_sender.clone()),
            job_cards: job_cards::JobCardService::new(event_sender),
        }
    }
}
