use assert_matches::assert_matches;
use milltrack_api::errors::ServiceError;
use milltrack_api::events::create_event_channel;
use milltrack_api::services::job_cards::{
    ConfirmationDetails, CreateJobCardInput, JobCardService, JobCardStatus, TransactionType,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

fn service() -> JobCardService {
    let (sender, receiver) = create_event_channel(64);
    // Keep the consumer alive for the duration of the test.
    std::mem::forget(receiver);
    JobCardService::new(Arc::new(sender))
}

async fn card_with_stage(service: &JobCardService, stage: &str) -> Uuid {
    service
        .create_card(CreateJobCardInput {
            output_item: "2/60 combed yarn".to_string(),
            quantity: Some(dec!(120)),
            current_stage: stage.to_string(),
            next_action: None,
            instructions: None,
            requirements: vec![],
        })
        .await
        .unwrap()
        .id
}

/// Walks a card to Completed through the two-step protocol.
async fn complete_card(service: &JobCardService, id: Uuid) {
    for _ in 0..3 {
        let pending = service.advance_status(id, 1).unwrap().unwrap();
        service
            .confirm_status_change(pending, ConfirmationDetails::default())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn new_cards_start_received_with_no_transactions() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;
    let card = service.get_card(id).unwrap();
    assert_eq!(card.status, JobCardStatus::Received);
    assert!(card.transactions.is_empty());
}

#[tokio::test]
async fn advance_requires_confirmation_before_mutating() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;

    let pending = service.advance_status(id, 1).unwrap().unwrap();
    assert_eq!(pending.from_status, JobCardStatus::Received);
    assert_eq!(pending.to_status, JobCardStatus::InProduction);
    // Status changes stay on the current stage.
    assert_eq!(pending.from_process, "Hank Winding");
    assert_eq!(pending.to_process, "Hank Winding");

    // Nothing changed yet.
    let card = service.get_card(id).unwrap();
    assert_eq!(card.status, JobCardStatus::Received);
    assert!(card.transactions.is_empty());

    let card = service
        .confirm_status_change(pending, ConfirmationDetails::default())
        .await
        .unwrap();
    assert_eq!(card.status, JobCardStatus::InProduction);
    assert_eq!(card.transactions.len(), 1);
    assert_eq!(card.transactions[0].kind, TransactionType::Status);
}

#[tokio::test]
async fn boundary_advance_is_a_noop() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;

    // Backward from Received: clamped, nothing pending.
    assert!(service.advance_status(id, -1).unwrap().is_none());
    let card = service.get_card(id).unwrap();
    assert_eq!(card.status, JobCardStatus::Received);
    assert!(card.transactions.is_empty());

    complete_card(&service, id).await;

    // Forward from Completed: same.
    assert!(service.advance_status(id, 1).unwrap().is_none());
    let card = service.get_card(id).unwrap();
    assert_eq!(card.status, JobCardStatus::Completed);
    assert_eq!(card.transactions.len(), 3);
}

#[tokio::test]
async fn statuses_never_skip_the_linear_order() {
    let service = service();
    let id = card_with_stage(&service, "Quality Bay").await;

    // Walk to Quality.
    for _ in 0..2 {
        let pending = service.advance_status(id, 1).unwrap().unwrap();
        service
            .confirm_status_change(pending, ConfirmationDetails::default())
            .await
            .unwrap();
    }
    assert_eq!(service.get_card(id).unwrap().status, JobCardStatus::Quality);

    let pending = service.advance_status(id, 1).unwrap().unwrap();
    assert_eq!(pending.to_status, JobCardStatus::Completed);
}

#[tokio::test]
async fn stale_confirmation_is_rejected() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;

    let first = service.advance_status(id, 1).unwrap().unwrap();
    let second = service.advance_status(id, 1).unwrap().unwrap();
    service
        .confirm_status_change(first, ConfirmationDetails::default())
        .await
        .unwrap();

    // The card already moved; the duplicate request is stale.
    let result = service
        .confirm_status_change(second, ConfirmationDetails::default())
        .await;
    assert_matches!(result, Err(ServiceError::ConcurrentModification(_)));
}

#[tokio::test]
async fn reroute_requires_completed_and_a_different_destination() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;

    let result = service
        .record_reroute(id, "Dyeing".to_string(), ConfirmationDetails::default())
        .await;
    assert_matches!(result, Err(ServiceError::InvalidOperation(_)));

    complete_card(&service, id).await;

    // Destination equal to origin is blocked, no transaction appended.
    let before = service.get_card(id).unwrap().transactions.len();
    let result = service
        .record_reroute(
            id,
            "Hank Winding".to_string(),
            ConfirmationDetails::default(),
        )
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
    assert_eq!(service.get_card(id).unwrap().transactions.len(), before);

    let card = service
        .record_reroute(id, "Dyeing".to_string(), ConfirmationDetails::default())
        .await
        .unwrap();
    assert_eq!(card.current_stage, "Dyeing");
    assert_eq!(card.status, JobCardStatus::Completed);
    assert_eq!(card.transactions[0].kind, TransactionType::Reroute);
    assert_eq!(card.transactions[0].from_process.as_deref(), Some("Hank Winding"));
    assert_eq!(card.transactions[0].to_process.as_deref(), Some("Dyeing"));
    // The status is recorded unchanged on both sides of the entry.
    assert_eq!(card.transactions[0].from_status, Some(JobCardStatus::Completed));
    assert_eq!(card.transactions[0].to_status, Some(JobCardStatus::Completed));
}

#[tokio::test]
async fn production_entry_never_touches_status_or_stage() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;

    let card = service
        .record_production_entry(
            id,
            ConfirmationDetails {
                weight_in: Some(dec!(50)),
                weight_out: Some(dec!(48.2)),
                notes: Some("shift A".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(card.status, JobCardStatus::Received);
    assert_eq!(card.current_stage, "Hank Winding");
    assert_eq!(card.transactions.len(), 1);
    let txn = &card.transactions[0];
    assert_eq!(txn.kind, TransactionType::Production);
    assert_eq!(txn.from_status, None);
    assert_eq!(txn.to_status, None);
    assert_eq!(txn.from_process.as_deref(), Some("Hank Winding"));
    assert_eq!(txn.to_process.as_deref(), Some("Hank Winding"));
    assert_eq!(txn.weight_in, Some(dec!(50)));
    assert_eq!(txn.weight_out, Some(dec!(48.2)));
}

#[tokio::test]
async fn transactions_are_prepended() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;

    service
        .record_production_entry(
            id,
            ConfirmationDetails {
                notes: Some("first".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let card = service
        .record_production_entry(
            id,
            ConfirmationDetails {
                notes: Some("second".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(card.transactions[0].notes.as_deref(), Some("second"));
    assert_eq!(card.transactions[1].notes.as_deref(), Some("first"));
}

#[tokio::test]
async fn requirements_allow_duplicates_and_remove_by_index() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;

    service.add_requirement(id, "steam set".to_string()).unwrap();
    service.add_requirement(id, "soft wind".to_string()).unwrap();
    let card = service.add_requirement(id, "steam set".to_string()).unwrap();
    assert_eq!(card.requirements, vec!["steam set", "soft wind", "steam set"]);

    let card = service.remove_requirement(id, 1).unwrap();
    assert_eq!(card.requirements, vec!["steam set", "steam set"]);

    assert_matches!(
        service.remove_requirement(id, 5),
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn invalid_direction_is_rejected() {
    let service = service();
    let id = card_with_stage(&service, "Hank Winding").await;
    assert_matches!(
        service.advance_status(id, 2),
        Err(ServiceError::ValidationError(_))
    );
}
