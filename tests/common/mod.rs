#![allow(dead_code)]

use milltrack_api::db::DbPool;
use milltrack_api::entities::{item, process};
use milltrack_api::events::create_event_channel;
use milltrack_api::migrator::Migrator;
use milltrack_api::services::AppServices;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Fresh in-memory database with the full schema applied, plus the
/// service container under test. The receiver is returned so events
/// sent during a test are not dropped on a closed channel.
pub async fn setup() -> (
    AppServices,
    Arc<DbPool>,
    tokio::sync::mpsc::Receiver<milltrack_api::events::Event>,
) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");

    let db = Arc::new(db);
    let (sender, receiver) = create_event_channel(64);
    let services = AppServices::new(db.clone(), Arc::new(sender));
    (services, db, receiver)
}

pub async fn seed_process(services: &AppServices, slug: &str, name: &str) -> process::Model {
    services
        .processes
        .create_process(milltrack_api::services::processes::CreateProcessInput {
            slug: slug.to_string(),
            name: name.to_string(),
            description: None,
            sequence: None,
        })
        .await
        .expect("seed process")
}

pub async fn seed_item(services: &AppServices, sku: &str, name: &str) -> item::Model {
    services
        .items
        .create_item(milltrack_api::services::items::CreateItemInput {
            sku: sku.to_string(),
            name: name.to_string(),
            category: None,
            unit: "KG".to_string(),
            unit_cost: None,
            reorder_level: None,
            vendor: None,
            notes: None,
        })
        .await
        .expect("seed item")
}
