mod common;

use assert_matches::assert_matches;
use common::{seed_process, setup};
use milltrack_api::entities::batch::BatchStatus;
use milltrack_api::errors::ServiceError;
use milltrack_api::services::batches::{BatchFilter, CreateBatchInput, UpdateBatchInput};
use rust_decimal_macros::dec;

fn create_input(code: &str, process_id: uuid::Uuid) -> CreateBatchInput {
    CreateBatchInput {
        code: code.to_string(),
        process_id,
        bom_template_id: None,
        status: None,
        planned_quantity: None,
        input_quantity: None,
        supervisor_id: None,
        created_by: None,
        notes: None,
    }
}

#[tokio::test]
async fn status_defaults_to_scheduled() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "hank-winding", "Hank Winding").await;

    let batch = services
        .batches
        .create_batch(create_input("BATCH-1", process.id))
        .await
        .unwrap();
    assert_eq!(batch.batch.status, BatchStatus::Scheduled);
    assert!(batch.batch.started_at.is_none());
}

#[tokio::test]
async fn duplicate_code_is_a_conflict() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "dyeing", "Dyeing").await;

    services
        .batches
        .create_batch(create_input("BATCH-DUP", process.id))
        .await
        .unwrap();
    let result = services
        .batches
        .create_batch(create_input("BATCH-DUP", process.id))
        .await;
    assert_matches!(result, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "warping", "Warping").await;
    let batch = services
        .batches
        .create_batch(create_input("BATCH-EMPTY", process.id))
        .await
        .unwrap();

    let result = services
        .batches
        .update_batch(batch.batch.id, UpdateBatchInput::default())
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(msg)) if msg.contains("Nothing to update"));
}

#[tokio::test]
async fn lifecycle_walks_forward_and_stamps_timestamps() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "spinning", "Spinning").await;
    let batch = services
        .batches
        .create_batch(create_input("BATCH-LIFE", process.id))
        .await
        .unwrap();
    let id = batch.batch.id;

    let step = |status: BatchStatus| UpdateBatchInput {
        status: Some(status),
        ..Default::default()
    };

    let in_progress = services
        .batches
        .update_batch(id, step(BatchStatus::InProgress))
        .await
        .unwrap();
    assert!(in_progress.batch.started_at.is_some());

    services
        .batches
        .update_batch(id, step(BatchStatus::Paused))
        .await
        .unwrap();
    services
        .batches
        .update_batch(id, step(BatchStatus::InProgress))
        .await
        .unwrap();
    services
        .batches
        .update_batch(id, step(BatchStatus::AwaitingQc))
        .await
        .unwrap();
    let completed = services
        .batches
        .update_batch(id, step(BatchStatus::Completed))
        .await
        .unwrap();
    assert!(completed.batch.completed_at.is_some());

    // Terminal: no further moves, not even cancel.
    let result = services
        .batches
        .update_batch(id, step(BatchStatus::Cancelled))
        .await;
    assert_matches!(result, Err(ServiceError::InvalidStatus(_)));
}

#[tokio::test]
async fn skipping_states_is_rejected() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "reeling", "Reeling").await;
    let batch = services
        .batches
        .create_batch(create_input("BATCH-SKIP", process.id))
        .await
        .unwrap();

    let result = services
        .batches
        .update_batch(
            batch.batch.id,
            UpdateBatchInput {
                status: Some(BatchStatus::Completed),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::InvalidStatus(_)));
}

#[tokio::test]
async fn cancel_is_reachable_from_any_non_terminal_state() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "twisting", "Twisting").await;
    let batch = services
        .batches
        .create_batch(create_input("BATCH-CANCEL", process.id))
        .await
        .unwrap();

    let cancelled = services
        .batches
        .update_batch(
            batch.batch.id,
            UpdateBatchInput {
                status: Some(BatchStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cancelled.batch.status, BatchStatus::Cancelled);
}

#[tokio::test]
async fn efficiency_is_derived_not_stored() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "carding", "Carding").await;
    let batch = services
        .batches
        .create_batch(create_input("BATCH-EFF", process.id))
        .await
        .unwrap();
    assert_eq!(batch.efficiency, None);

    let updated = services
        .batches
        .update_batch(
            batch.batch.id,
            UpdateBatchInput {
                input_quantity: Some(dec!(200)),
                output_quantity: Some(dec!(150)),
                wastage_percentage: Some(dec!(25)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.efficiency, Some(dec!(0.75)));

    // Zero input makes the metric undefined again.
    let zeroed = services
        .batches
        .update_batch(
            batch.batch.id,
            UpdateBatchInput {
                input_quantity: Some(dec!(0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(zeroed.efficiency, None);
}

#[tokio::test]
async fn wastage_outside_0_to_100_is_rejected() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "combing", "Combing").await;
    let batch = services
        .batches
        .create_batch(create_input("BATCH-WASTE", process.id))
        .await
        .unwrap();

    let result = services
        .batches
        .update_batch(
            batch.batch.id,
            UpdateBatchInput {
                wastage_percentage: Some(dec!(120)),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn status_filter_narrows_the_listing() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "sizing", "Sizing").await;

    services
        .batches
        .create_batch(create_input("BATCH-A", process.id))
        .await
        .unwrap();
    let b = services
        .batches
        .create_batch(create_input("BATCH-B", process.id))
        .await
        .unwrap();
    services
        .batches
        .update_batch(
            b.batch.id,
            UpdateBatchInput {
                status: Some(BatchStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (in_progress, total) = services
        .batches
        .list_batches(
            BatchFilter {
                statuses: vec![BatchStatus::InProgress],
                ..Default::default()
            },
            1,
            Some(20),
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].batch.code, "BATCH-B");
}

#[tokio::test]
async fn listing_limit_falls_back_to_default_outside_range() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "doubling", "Doubling").await;

    for n in 0..12 {
        services
            .batches
            .create_batch(create_input(&format!("BATCH-PAGE-{}", n), process.id))
            .await
            .unwrap();
    }

    // Out-of-range limits fall back to the default page size of 10.
    let (page, total) = services
        .batches
        .list_batches(BatchFilter::default(), 1, Some(0))
        .await
        .unwrap();
    assert_eq!(total, 12);
    assert_eq!(page.len(), 10);

    let (page, _) = services
        .batches
        .list_batches(BatchFilter::default(), 1, Some(101))
        .await
        .unwrap();
    assert_eq!(page.len(), 10);

    let (page, _) = services
        .batches
        .list_batches(BatchFilter::default(), 1, None)
        .await
        .unwrap();
    assert_eq!(page.len(), 10);

    // In-range limits are honored as given.
    let (page, _) = services
        .batches
        .list_batches(BatchFilter::default(), 1, Some(3))
        .await
        .unwrap();
    assert_eq!(page.len(), 3);
}

#[tokio::test]
async fn update_restating_stored_values_is_rejected() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "mercerizing", "Mercerizing").await;
    let mut input = create_input("BATCH-SAME", process.id);
    input.notes = Some("shift A".to_string());
    let batch = services.batches.create_batch(input).await.unwrap();
    let id = batch.batch.id;

    // Supplying only the values already on record changes nothing and
    // fails the same way an empty payload does.
    let result = services
        .batches
        .update_batch(
            id,
            UpdateBatchInput {
                status: Some(BatchStatus::Scheduled),
                notes: Some("shift A".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(msg)) if msg.contains("Nothing to update"));

    // One differing field is enough, even when the rest restate.
    let updated = services
        .batches
        .update_batch(
            id,
            UpdateBatchInput {
                status: Some(BatchStatus::Scheduled),
                notes: Some("shift B".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.batch.notes.as_deref(), Some("shift B"));
    assert_eq!(updated.batch.status, BatchStatus::Scheduled);
}

#[tokio::test]
async fn delete_removes_batch_and_its_ledger_rows() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "winding", "Winding").await;
    let item = common::seed_item(&services, "ITEM-LEDGER", "Ledger item").await;
    let batch = services
        .batches
        .create_batch(create_input("BATCH-DEL", process.id))
        .await
        .unwrap();
    let id = batch.batch.id;

    services
        .movements
        .record_movement(
            id,
            milltrack_api::services::movements::RecordMovementInput {
                from_process_id: None,
                to_process_id: Some(process.id),
                quantity: Some(dec!(10)),
                occurred_at: None,
                notes: None,
                recorded_by: None,
            },
        )
        .await
        .unwrap();
    services
        .usage
        .record_usage(
            id,
            milltrack_api::services::usage::RecordUsageInput {
                item_id: item.id,
                actual_quantity: dec!(4),
                unit: "kg".to_string(),
                expected_quantity: None,
                notes: None,
                recorded_by: None,
            },
        )
        .await
        .unwrap();

    services.batches.delete_batch(id).await.unwrap();

    assert_matches!(
        services.batches.get_batch(id).await,
        Err(ServiceError::NotFound(_))
    );
    assert!(services.movements.list_for_batch(id).await.unwrap().is_empty());
    assert!(services.usage.list_for_batch(id).await.unwrap().is_empty());

    // Deleting again is a clean not-found.
    assert_matches!(
        services.batches.delete_batch(id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn supervisor_links_back_to_their_batches() {
    use milltrack_api::services::workers::CreateWorkerInput;
    use sea_orm::ModelTrait;

    let (services, db, _rx) = setup().await;
    let process = seed_process(&services, "folding", "Folding").await;
    let worker = services
        .workers
        .create_worker(CreateWorkerInput {
            code: "W-SUP".to_string(),
            display_name: "Meera".to_string(),
            role: Some("Supervisor".to_string()),
            department: None,
            shift: None,
            contact: None,
            skills: None,
        })
        .await
        .unwrap();

    let mut input = create_input("BATCH-SUP", process.id);
    input.supervisor_id = Some(worker.id);
    services.batches.create_batch(input).await.unwrap();

    let supervised = worker
        .find_related(milltrack_api::entities::batch::Entity)
        .all(&*db)
        .await
        .unwrap();
    assert_eq!(supervised.len(), 1);
    assert_eq!(supervised[0].code, "BATCH-SUP");
    assert_eq!(supervised[0].supervisor_id, Some(worker.id));
}

#[tokio::test]
async fn batch_must_start_in_draft_or_scheduled() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "finishing", "Finishing").await;

    let mut input = create_input("BATCH-START", process.id);
    input.status = Some(BatchStatus::Completed);
    let result = services.batches.create_batch(input).await;
    assert_matches!(result, Err(ServiceError::InvalidStatus(_)));

    let mut draft = create_input("BATCH-DRAFT", process.id);
    draft.status = Some(BatchStatus::Draft);
    let created = services.batches.create_batch(draft).await.unwrap();
    assert_eq!(created.batch.status, BatchStatus::Draft);
}
