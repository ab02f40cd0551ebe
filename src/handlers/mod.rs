pub mod batches;
pub mod bom_templates;
pub mod common;
pub mod items;
pub mod job_cards;
pub mod masters;
pub mod processes;
pub mod uoms;
pub mod workers;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::AppServices;
use std::sync::Arc;

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, event_sender: Arc<EventSender>) -> Self {
        let services = AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}
