mod common;

use assert_matches::assert_matches;
use common::{seed_item, seed_process, setup};
use milltrack_api::entities::uom::UomType;
use milltrack_api::entities::worker::WorkerStatus;
use milltrack_api::errors::ServiceError;
use milltrack_api::services::processes::{CreateProcessInput, UpdateProcessInput};
use milltrack_api::services::uoms::CreateUomInput;
use milltrack_api::services::workers::CreateWorkerInput;

#[tokio::test]
async fn process_slug_must_be_lowercase_hyphenated() {
    let (services, _db, _rx) = setup().await;

    let result = services
        .processes
        .create_process(CreateProcessInput {
            slug: "Hank Winding".to_string(),
            name: "Hank Winding".to_string(),
            description: None,
            sequence: None,
        })
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn duplicate_process_slug_is_a_conflict() {
    let (services, _db, _rx) = setup().await;
    seed_process(&services, "dyeing", "Dyeing").await;

    let result = services
        .processes
        .create_process(CreateProcessInput {
            slug: "dyeing".to_string(),
            name: "Dyeing again".to_string(),
            description: None,
            sequence: None,
        })
        .await;
    assert_matches!(result, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn inactive_processes_drop_out_of_the_active_listing() {
    let (services, _db, _rx) = setup().await;
    let winding = seed_process(&services, "winding", "Winding").await;
    seed_process(&services, "dyeing", "Dyeing").await;

    services
        .processes
        .deactivate_process(winding.id)
        .await
        .unwrap();

    let active = services.processes.list_processes(true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].slug, "dyeing");

    let all = services.processes.list_processes(false).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn processes_list_in_sequence_order() {
    let (services, _db, _rx) = setup().await;
    for (slug, seq) in [("finishing", 30), ("winding", 10), ("dyeing", 20)] {
        services
            .processes
            .create_process(CreateProcessInput {
                slug: slug.to_string(),
                name: slug.to_string(),
                description: None,
                sequence: Some(seq),
            })
            .await
            .unwrap();
    }

    let processes = services.processes.list_processes(false).await.unwrap();
    let slugs: Vec<_> = processes.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["winding", "dyeing", "finishing"]);
}

#[tokio::test]
async fn uom_code_is_normalized_and_precision_bounded() {
    let (services, _db, _rx) = setup().await;

    let uom = services
        .uoms
        .create_uom(CreateUomInput {
            code: "kg".to_string(),
            name: "Kilogram".to_string(),
            uom_type: UomType::Weight,
            precision: 3,
        })
        .await
        .unwrap();
    assert_eq!(uom.code, "KG");

    let result = services
        .uoms
        .create_uom(CreateUomInput {
            code: "M".to_string(),
            name: "Metre".to_string(),
            uom_type: UomType::Length,
            precision: 7,
        })
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn duplicate_item_sku_is_a_conflict() {
    let (services, _db, _rx) = setup().await;
    seed_item(&services, "SKU-1", "Item one").await;

    let result = services
        .items
        .create_item(milltrack_api::services::items::CreateItemInput {
            sku: "SKU-1".to_string(),
            name: "Item two".to_string(),
            category: None,
            unit: "KG".to_string(),
            unit_cost: None,
            reorder_level: None,
            vendor: None,
            notes: None,
        })
        .await;
    assert_matches!(result, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn unreferenced_item_can_be_hard_deleted() {
    let (services, _db, _rx) = setup().await;
    let item = seed_item(&services, "SKU-FREE", "Free item").await;

    services.items.delete_item(item.id).await.unwrap();
    assert_matches!(
        services.items.get_item(item.id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn worker_allocation_round_trip() {
    let (services, _db, _rx) = setup().await;
    let winding = seed_process(&services, "winding", "Winding").await;
    let dyeing = seed_process(&services, "dyeing", "Dyeing").await;

    let worker = services
        .workers
        .create_worker(CreateWorkerInput {
            code: "W-001".to_string(),
            display_name: "Asha".to_string(),
            role: Some("Operator".to_string()),
            department: None,
            shift: Some("A".to_string()),
            contact: None,
            skills: Some(vec!["winding".to_string(), "dyeing".to_string()]),
        })
        .await
        .unwrap();
    assert_eq!(worker.status, WorkerStatus::Active);

    services
        .workers
        .assign_to_process(worker.id, winding.id)
        .await
        .unwrap();
    services
        .workers
        .assign_to_process(worker.id, dyeing.id)
        .await
        .unwrap();

    // Same pair twice trips the composite key.
    assert_matches!(
        services.workers.assign_to_process(worker.id, winding.id).await,
        Err(ServiceError::Conflict(_))
    );

    let allocated = services.workers.allocated_processes(worker.id).await.unwrap();
    assert_eq!(allocated.len(), 2);

    services
        .workers
        .unassign_from_process(worker.id, winding.id)
        .await
        .unwrap();
    let allocated = services.workers.allocated_processes(worker.id).await.unwrap();
    assert_eq!(allocated.len(), 1);
    assert_eq!(allocated[0].slug, "dyeing");

    // Removing an allocation that is not there is a clean not-found.
    assert_matches!(
        services
            .workers
            .unassign_from_process(worker.id, winding.id)
            .await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn allocation_against_missing_process_is_not_found() {
    let (services, _db, _rx) = setup().await;
    let worker = services
        .workers
        .create_worker(CreateWorkerInput {
            code: "W-002".to_string(),
            display_name: "Ravi".to_string(),
            role: None,
            department: None,
            shift: None,
            contact: None,
            skills: None,
        })
        .await
        .unwrap();

    assert_matches!(
        services
            .workers
            .assign_to_process(worker.id, uuid::Uuid::new_v4())
            .await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn nothing_to_update_is_not_an_error_for_masters() {
    // Master updates with all-None payloads are accepted as no-ops,
    // unlike batches where an empty update is rejected.
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "winding", "Winding").await;

    let unchanged = services
        .processes
        .update_process(process.id, UpdateProcessInput::default())
        .await
        .unwrap();
    assert_eq!(unchanged.name, process.name);
}
