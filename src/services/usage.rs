use crate::{
    db::DbPool,
    entities::{
        batch::Entity as BatchEntity, bom_usage, bom_usage::Entity as BomUsageEntity,
        item::Entity as ItemEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RecordUsageInput {
    pub item_id: Uuid,
    pub actual_quantity: Decimal,
    pub unit: String,
    /// Snapshot of the template expectation at record time; kept as
    /// submitted so history survives later template edits
    pub expected_quantity: Option<Decimal>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
}

/// Append-only ledger of actual-vs-expected material consumption.
#[derive(Clone)]
pub struct UsageService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl UsageService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn record_usage(
        &self,
        batch_id: Uuid,
        input: RecordUsageInput,
    ) -> Result<bom_usage::Model, ServiceError> {
        if input.actual_quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "actual_quantity must not be negative".to_string(),
            ));
        }
        if input.unit.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "unit is required".to_string(),
            ));
        }
        BatchEntity::find_by_id(batch_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Batch {} not found", batch_id)))?;
        ItemEntity::find_by_id(input.item_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", input.item_id)))?;

        let model = bom_usage::ActiveModel {
            id: Set(Uuid::new_v4()),
            batch_id: Set(batch_id),
            item_id: Set(input.item_id),
            expected_quantity: Set(input.expected_quantity),
            actual_quantity: Set(input.actual_quantity),
            unit: Set(input.unit),
            notes: Set(input.notes),
            recorded_by: Set(input.recorded_by),
            recorded_at: Set(Utc::now()),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::UsageRecorded {
                batch_id,
                usage_id: created.id,
            })
            .await;

        Ok(created)
    }

    /// All consumption entries for one batch, most recent first.
    #[instrument(skip(self))]
    pub async fn list_for_batch(
        &self,
        batch_id: Uuid,
    ) -> Result<Vec<bom_usage::Model>, ServiceError> {
        Ok(BomUsageEntity::find()
            .filter(bom_usage::Column::BatchId.eq(batch_id))
            .order_by_desc(bom_usage::Column::RecordedAt)
            .all(&*self.db_pool)
            .await?)
    }
}
