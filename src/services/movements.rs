use crate::{
    db::DbPool,
    entities::{
        batch::Entity as BatchEntity, batch_movement, batch_movement::Entity as BatchMovementEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Resolves a caller-supplied limit: values outside [1, 100] fall back
/// to the default of 10.
pub fn resolve_limit(limit: Option<u64>) -> u64 {
    match limit {
        Some(l) if (1..=MAX_LIMIT).contains(&l) => l,
        _ => DEFAULT_LIMIT,
    }
}

#[derive(Debug, Clone)]
pub struct RecordMovementInput {
    pub from_process_id: Option<Uuid>,
    pub to_process_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    /// Defaults to now when omitted
    pub occurred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
}

/// Append-only ledger of inter-process transfers. Rows are never
/// updated or deleted here; reads come back newest-first.
#[derive(Clone)]
pub struct MovementService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MovementService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Appends one transfer entry. Self-transfers (from == to) are
    /// allowed; the floor uses them for weight corrections.
    #[instrument(skip(self, input))]
    pub async fn record_movement(
        &self,
        batch_id: Uuid,
        input: RecordMovementInput,
    ) -> Result<batch_movement::Model, ServiceError> {
        BatchEntity::find_by_id(batch_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Batch {} not found", batch_id)))?;

        if let Some(quantity) = input.quantity {
            if quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Movement quantity must not be negative".to_string(),
                ));
            }
        }

        let model = batch_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            batch_id: Set(batch_id),
            from_process_id: Set(input.from_process_id),
            to_process_id: Set(input.to_process_id),
            quantity: Set(input.quantity),
            occurred_at: Set(input.occurred_at.unwrap_or_else(Utc::now)),
            notes: Set(input.notes),
            recorded_by: Set(input.recorded_by),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::MovementRecorded {
                batch_id,
                movement_id: created.id,
            })
            .await;

        Ok(created)
    }

    /// All entries for one batch, most recent first.
    #[instrument(skip(self))]
    pub async fn list_for_batch(
        &self,
        batch_id: Uuid,
    ) -> Result<Vec<batch_movement::Model>, ServiceError> {
        Ok(BatchMovementEntity::find()
            .filter(batch_movement::Column::BatchId.eq(batch_id))
            .order_by_desc(batch_movement::Column::OccurredAt)
            .all(&*self.db_pool)
            .await?)
    }

    /// Entries touching a process as either origin or destination,
    /// across all batches, most recent first, capped at `limit`.
    #[instrument(skip(self))]
    pub async fn list_for_process(
        &self,
        process_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<batch_movement::Model>, ServiceError> {
        let limit = resolve_limit(limit);
        Ok(BatchMovementEntity::find()
            .filter(
                Condition::any()
                    .add(batch_movement::Column::FromProcessId.eq(process_id))
                    .add(batch_movement::Column::ToProcessId.eq(process_id)),
            )
            .order_by_desc(batch_movement::Column::OccurredAt)
            .limit(limit)
            .all(&*self.db_pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_falls_back_to_default_outside_range() {
        assert_eq!(resolve_limit(None), 10);
        assert_eq!(resolve_limit(Some(0)), 10);
        assert_eq!(resolve_limit(Some(101)), 10);
        assert_eq!(resolve_limit(Some(1)), 1);
        assert_eq!(resolve_limit(Some(100)), 100);
        assert_eq!(resolve_limit(Some(25)), 25);
    }
}
