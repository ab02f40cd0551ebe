mod common;

use assert_matches::assert_matches;
use common::{seed_item, seed_process, setup};
use milltrack_api::errors::ServiceError;
use milltrack_api::services::batches::CreateBatchInput;
use milltrack_api::services::bom_templates::{
    BomTemplateFilter, ComponentInput, CreateBomTemplateInput, UpdateBomTemplateInput,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn component(item_id: Uuid, qty: rust_decimal::Decimal) -> ComponentInput {
    ComponentInput {
        item_id,
        expected_quantity: qty,
        unit: "kg".to_string(),
        position: None,
    }
}

#[tokio::test]
async fn update_replaces_component_set_exactly() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "hank-winding", "Hank Winding").await;
    let item_a = seed_item(&services, "ITEM-A", "Yarn A").await;
    let item_b = seed_item(&services, "ITEM-B", "Yarn B").await;

    let detail = services
        .bom_templates
        .create_template(CreateBomTemplateInput {
            code: "BOM-TEST-1".to_string(),
            name: "Test template".to_string(),
            process_id: process.id,
            output_item_id: None,
            output_quantity: None,
            instructions: None,
            components: vec![component(item_a.id, dec!(10))],
        })
        .await
        .unwrap();
    assert_eq!(detail.components.len(), 1);

    let updated = services
        .bom_templates
        .update_template(
            detail.template.id,
            UpdateBomTemplateInput {
                components: Some(vec![
                    component(item_a.id, dec!(15)),
                    component(item_b.id, dec!(5)),
                ]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.components.len(), 2);
    assert_eq!(updated.components[0].component_item_id, item_a.id);
    assert_eq!(updated.components[0].expected_quantity, dec!(15));
    assert_eq!(updated.components[1].component_item_id, item_b.id);
    assert_eq!(updated.components[1].expected_quantity, dec!(5));
    // No row from the original submission survives the replace.
    assert!(updated
        .components
        .iter()
        .all(|c| c.expected_quantity != dec!(10)));
}

#[tokio::test]
async fn failed_replace_leaves_original_components_intact() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "dyeing", "Dyeing").await;
    let item_a = seed_item(&services, "ITEM-A", "Yarn A").await;

    let detail = services
        .bom_templates
        .create_template(CreateBomTemplateInput {
            code: "BOM-ROLLBACK".to_string(),
            name: "Rollback template".to_string(),
            process_id: process.id,
            output_item_id: None,
            output_quantity: None,
            instructions: None,
            components: vec![component(item_a.id, dec!(10))],
        })
        .await
        .unwrap();

    // Second component references a missing item, so the insert fails
    // after the delete already ran inside the transaction.
    let result = services
        .bom_templates
        .update_template(
            detail.template.id,
            UpdateBomTemplateInput {
                components: Some(vec![
                    component(item_a.id, dec!(20)),
                    component(Uuid::new_v4(), dec!(5)),
                ]),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());

    let after = services
        .bom_templates
        .get_template(detail.template.id)
        .await
        .unwrap();
    assert_eq!(after.components.len(), 1);
    assert_eq!(after.components[0].expected_quantity, dec!(10));
}

#[tokio::test]
async fn create_rejects_non_positive_component_quantity() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "warping", "Warping").await;
    let item_a = seed_item(&services, "ITEM-A", "Yarn A").await;

    let result = services
        .bom_templates
        .create_template(CreateBomTemplateInput {
            code: "BOM-BAD".to_string(),
            name: "Bad template".to_string(),
            process_id: process.id,
            output_item_id: None,
            output_quantity: None,
            instructions: None,
            components: vec![component(item_a.id, dec!(0))],
        })
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn duplicate_code_is_a_conflict() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "spinning", "Spinning").await;

    let input = |code: &str| CreateBomTemplateInput {
        code: code.to_string(),
        name: "Template".to_string(),
        process_id: process.id,
        output_item_id: None,
        output_quantity: None,
        instructions: None,
        components: vec![],
    };

    services
        .bom_templates
        .create_template(input("BOM-DUP"))
        .await
        .unwrap();
    let result = services.bom_templates.create_template(input("BOM-DUP")).await;
    assert_matches!(result, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn delete_is_blocked_while_a_batch_references_the_template() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "reeling", "Reeling").await;

    let detail = services
        .bom_templates
        .create_template(CreateBomTemplateInput {
            code: "BOM-USED".to_string(),
            name: "Used template".to_string(),
            process_id: process.id,
            output_item_id: None,
            output_quantity: None,
            instructions: None,
            components: vec![],
        })
        .await
        .unwrap();

    services
        .batches
        .create_batch(CreateBatchInput {
            code: "BATCH-1".to_string(),
            process_id: process.id,
            bom_template_id: Some(detail.template.id),
            status: None,
            planned_quantity: None,
            input_quantity: None,
            supervisor_id: None,
            created_by: None,
            notes: None,
        })
        .await
        .unwrap();

    let result = services.bom_templates.delete_template(detail.template.id).await;
    assert_matches!(result, Err(ServiceError::Conflict(_)));

    // Deactivation is the supported path for used templates.
    let deactivated = services
        .bom_templates
        .update_template(
            detail.template.id,
            UpdateBomTemplateInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!deactivated.template.is_active);
}

#[tokio::test]
async fn get_is_idempotent() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "twisting", "Twisting").await;
    let item_a = seed_item(&services, "ITEM-A", "Yarn A").await;

    let detail = services
        .bom_templates
        .create_template(CreateBomTemplateInput {
            code: "BOM-IDEM".to_string(),
            name: "Idempotent".to_string(),
            process_id: process.id,
            output_item_id: Some(item_a.id),
            output_quantity: Some(dec!(100)),
            instructions: Some("SOP".to_string()),
            components: vec![component(item_a.id, dec!(3))],
        })
        .await
        .unwrap();

    let first = services.bom_templates.get_template(detail.template.id).await.unwrap();
    let second = services.bom_templates.get_template(detail.template.id).await.unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn template_listing_limit_falls_back_to_default() {
    let (services, _db, _rx) = setup().await;
    let process = seed_process(&services, "warping", "Warping").await;

    for n in 0..12 {
        services
            .bom_templates
            .create_template(CreateBomTemplateInput {
                code: format!("BOM-PAGE-{}", n),
                name: format!("Template {}", n),
                process_id: process.id,
                output_item_id: None,
                output_quantity: None,
                instructions: None,
                components: vec![],
            })
            .await
            .unwrap();
    }

    let (page, total) = services
        .bom_templates
        .list_templates(BomTemplateFilter::default(), 1, Some(0))
        .await
        .unwrap();
    assert_eq!(total, 12);
    assert_eq!(page.len(), 10);

    let (page, _) = services
        .bom_templates
        .list_templates(BomTemplateFilter::default(), 1, Some(5))
        .await
        .unwrap();
    assert_eq!(page.len(), 5);
}
