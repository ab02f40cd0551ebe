use crate::{
    db::DbPool,
    entities::{
        batch, batch::BatchStatus, batch::Entity as BatchEntity, batch_movement,
        batch_movement::Entity as BatchMovementEntity, bom_usage,
        bom_usage::Entity as BomUsageEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::movements::resolve_limit,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateBatchInput {
    pub code: String,
    pub process_id: Uuid,
    pub bom_template_id: Option<Uuid>,
    /// Defaults to `scheduled` when omitted
    pub status: Option<BatchStatus>,
    pub planned_quantity: Option<Decimal>,
    pub input_quantity: Option<Decimal>,
    pub supervisor_id: Option<Uuid>,
    pub created_by: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBatchInput {
    pub status: Option<BatchStatus>,
    pub planned_quantity: Option<Decimal>,
    pub input_quantity: Option<Decimal>,
    pub output_quantity: Option<Decimal>,
    pub wastage_percentage: Option<Decimal>,
    pub supervisor_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl UpdateBatchInput {
    fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.planned_quantity.is_none()
            && self.input_quantity.is_none()
            && self.output_quantity.is_none()
            && self.wastage_percentage.is_none()
            && self.supervisor_id.is_none()
            && self.notes.is_none()
    }

    /// True when at least one supplied field differs from the stored
    /// record. A payload that restates current values is a no-op and
    /// gets rejected the same way an empty one is.
    fn differs_from(&self, current: &batch::Model) -> bool {
        self.status.map_or(false, |s| s != current.status)
            || self
                .planned_quantity
                .map_or(false, |v| Some(v) != current.planned_quantity)
            || self
                .input_quantity
                .map_or(false, |v| Some(v) != current.input_quantity)
            || self
                .output_quantity
                .map_or(false, |v| Some(v) != current.output_quantity)
            || self
                .wastage_percentage
                .map_or(false, |v| Some(v) != current.wastage_percentage)
            || self
                .supervisor_id
                .map_or(false, |v| Some(v) != current.supervisor_id)
            || self
                .notes
                .as_deref()
                .map_or(false, |n| Some(n) != current.notes.as_deref())
    }
}

/// Filters accepted by the batch list endpoint
#[derive(Debug, Clone, Default)]
pub struct BatchFilter {
    /// Comma-separated on the wire; unknown values already dropped
    pub statuses: Vec<BatchStatus>,
    pub process_id: Option<Uuid>,
    pub search: Option<String>,
}

/// Batch plus its derived efficiency, the shape list/get endpoints
/// return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchView {
    #[serde(flatten)]
    pub batch: batch::Model,
    pub efficiency: Option<Decimal>,
}

impl From<batch::Model> for BatchView {
    fn from(batch: batch::Model) -> Self {
        let efficiency = batch.efficiency();
        Self { batch, efficiency }
    }
}

/// Aggregate counters for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub total: u64,
    pub by_status: Vec<StatusCount>,
    pub in_progress: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

fn validate_wastage(pct: Decimal) -> Result<(), ServiceError> {
    if pct < Decimal::ZERO || pct > Decimal::from(100) {
        return Err(ServiceError::ValidationError(format!(
            "wastage_percentage must be between 0 and 100, got {}",
            pct
        )));
    }
    Ok(())
}

/// Service owning the batch lifecycle
#[derive(Clone)]
pub struct BatchService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl BatchService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_batch(&self, input: CreateBatchInput) -> Result<BatchView, ServiceError> {
        if input.code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Batch code is required".to_string(),
            ));
        }
        let status = input.status.unwrap_or(BatchStatus::Scheduled);
        if !matches!(status, BatchStatus::Draft | BatchStatus::Scheduled) {
            return Err(ServiceError::InvalidStatus(format!(
                "Batches start in draft or scheduled, not {}",
                status
            )));
        }

        let model = batch::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            process_id: Set(input.process_id),
            bom_template_id: Set(input.bom_template_id),
            status: Set(status),
            planned_quantity: Set(input.planned_quantity),
            input_quantity: Set(input.input_quantity),
            output_quantity: Set(None),
            wastage_percentage: Set(None),
            started_at: Set(None),
            completed_at: Set(None),
            supervisor_id: Set(input.supervisor_id),
            created_by: Set(input.created_by),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::BatchCreated {
                batch_id: created.id,
                process_id: created.process_id,
            })
            .await;

        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get_batch(&self, id: Uuid) -> Result<BatchView, ServiceError> {
        Ok(self.get_batch_model(id).await?.into())
    }

    async fn get_batch_model(&self, id: Uuid) -> Result<batch::Model, ServiceError> {
        BatchEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Batch {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_batches(
        &self,
        filter: BatchFilter,
        page: u64,
        limit: Option<u64>,
    ) -> Result<(Vec<BatchView>, u64), ServiceError> {
        let limit = resolve_limit(limit);
        let page = page.max(1) - 1;

        let mut query = BatchEntity::find().order_by_desc(batch::Column::CreatedAt);
        if !filter.statuses.is_empty() {
            query = query.filter(batch::Column::Status.is_in(filter.statuses));
        }
        if let Some(process_id) = filter.process_id {
            query = query.filter(batch::Column::ProcessId.eq(process_id));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let needle = search.trim().to_string();
            query = query.filter(
                Condition::any()
                    .add(batch::Column::Code.contains(&needle))
                    .add(batch::Column::Notes.contains(&needle)),
            );
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let views = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(BatchView::from)
            .collect();
        Ok((views, total))
    }

    /// Partial update. A payload that supplies nothing, or only values
    /// equal to the stored record, is rejected; a status change is
    /// validated against the lifecycle and stamps started_at or
    /// completed_at at the matching transition.
    #[instrument(skip(self, input))]
    pub async fn update_batch(
        &self,
        id: Uuid,
        input: UpdateBatchInput,
    ) -> Result<BatchView, ServiceError> {
        if input.is_empty() {
            return Err(ServiceError::ValidationError(
                "Nothing to update".to_string(),
            ));
        }
        if let Some(pct) = input.wastage_percentage {
            validate_wastage(pct)?;
        }

        let mut model = self.get_batch_model(id).await?;
        let old_status = model.status;

        if !input.differs_from(&model) {
            return Err(ServiceError::ValidationError(
                "Nothing to update".to_string(),
            ));
        }

        if let Some(next) = input.status.filter(|next| *next != old_status) {
            if !old_status.can_transition_to(next) {
                return Err(ServiceError::InvalidStatus(format!(
                    "Batch cannot move from {} to {}",
                    old_status, next
                )));
            }
            model.status = next;
            match next {
                BatchStatus::InProgress if model.started_at.is_none() => {
                    model.started_at = Some(Utc::now());
                }
                BatchStatus::Completed => {
                    model.completed_at = Some(Utc::now());
                }
                _ => {}
            }
        }
        if let Some(planned) = input.planned_quantity {
            model.planned_quantity = Some(planned);
        }
        if let Some(input_qty) = input.input_quantity {
            model.input_quantity = Some(input_qty);
        }
        if let Some(output_qty) = input.output_quantity {
            model.output_quantity = Some(output_qty);
        }
        if let Some(pct) = input.wastage_percentage {
            model.wastage_percentage = Some(pct);
        }
        if let Some(supervisor_id) = input.supervisor_id {
            model.supervisor_id = Some(supervisor_id);
        }
        if let Some(notes) = input.notes {
            model.notes = Some(notes);
        }

        let updated = model
            .into_active_model()
            .reset_all()
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        if updated.status != old_status {
            self.event_sender
                .send_or_log(Event::BatchStatusChanged {
                    batch_id: updated.id,
                    old_status: old_status.to_string(),
                    new_status: updated.status.to_string(),
                })
                .await;
        } else {
            self.event_sender
                .send_or_log(Event::BatchUpdated(updated.id))
                .await;
        }

        Ok(updated.into())
    }

    /// Administrative hard delete. Ledger rows referencing the batch
    /// are removed in the same transaction rather than orphaned.
    #[instrument(skip(self))]
    pub async fn delete_batch(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_batch_model(id).await?;

        let txn = self.db_pool.begin().await?;
        BatchMovementEntity::delete_many()
            .filter(batch_movement::Column::BatchId.eq(id))
            .exec(&txn)
            .await?;
        BomUsageEntity::delete_many()
            .filter(bom_usage::Column::BatchId.eq(id))
            .exec(&txn)
            .await?;
        BatchEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_db)?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::BatchDeleted(id)).await;
        Ok(())
    }

    /// Status breakdown for the dashboard cards.
    #[instrument(skip(self))]
    pub async fn metrics(&self) -> Result<BatchMetrics, ServiceError> {
        let statuses = [
            BatchStatus::Draft,
            BatchStatus::Scheduled,
            BatchStatus::InProgress,
            BatchStatus::Paused,
            BatchStatus::AwaitingQc,
            BatchStatus::Completed,
            BatchStatus::Cancelled,
        ];

        let mut by_status = Vec::with_capacity(statuses.len());
        let mut total = 0;
        let mut in_progress = 0;
        let mut completed = 0;
        for status in statuses {
            let count = BatchEntity::find()
                .filter(batch::Column::Status.eq(status))
                .count(&*self.db_pool)
                .await?;
            total += count;
            match status {
                BatchStatus::InProgress => in_progress = count,
                BatchStatus::Completed => completed = count,
                _ => {}
            }
            by_status.push(StatusCount {
                status: status.to_string(),
                count,
            });
        }

        Ok(BatchMetrics {
            total,
            by_status,
            in_progress,
            completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateBatchInput::default().is_empty());
        let input = UpdateBatchInput {
            notes: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!input.is_empty());
    }

    fn stored_batch() -> batch::Model {
        batch::Model {
            id: Uuid::new_v4(),
            code: "B-1".to_string(),
            process_id: Uuid::new_v4(),
            bom_template_id: None,
            status: BatchStatus::Scheduled,
            planned_quantity: Some(dec!(100)),
            input_quantity: None,
            output_quantity: None,
            wastage_percentage: None,
            started_at: None,
            completed_at: None,
            supervisor_id: None,
            created_by: None,
            notes: Some("shift A".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn restating_current_values_is_not_a_change() {
        let current = stored_batch();
        let same = UpdateBatchInput {
            status: Some(BatchStatus::Scheduled),
            planned_quantity: Some(dec!(100)),
            notes: Some("shift A".to_string()),
            ..Default::default()
        };
        assert!(!same.differs_from(&current));

        let new_notes = UpdateBatchInput {
            notes: Some("shift B".to_string()),
            ..Default::default()
        };
        assert!(new_notes.differs_from(&current));

        let new_quantity = UpdateBatchInput {
            planned_quantity: Some(dec!(120)),
            ..Default::default()
        };
        assert!(new_quantity.differs_from(&current));
    }

    #[test]
    fn wastage_bounds() {
        assert!(validate_wastage(dec!(0)).is_ok());
        assert!(validate_wastage(dec!(100)).is_ok());
        assert!(validate_wastage(dec!(42.5)).is_ok());
        assert!(validate_wastage(dec!(-0.1)).is_err());
        assert!(validate_wastage(dec!(100.1)).is_err());
    }
}
