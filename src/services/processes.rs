use crate::{
    db::DbPool,
    entities::{batch, batch::Entity as BatchEntity, process, process::Entity as ProcessEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Input payload for registering a process stage
#[derive(Debug, Clone)]
pub struct CreateProcessInput {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub sequence: Option<i32>,
}

/// Input payload for updating a process stage
#[derive(Debug, Clone, Default)]
pub struct UpdateProcessInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sequence: Option<i32>,
    pub is_active: Option<bool>,
}

/// Returns an error unless `slug` is lowercase-hyphenated
/// (`hank-winding`, `dyeing-2`).
fn validate_slug(slug: &str) -> Result<(), ServiceError> {
    let ok = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(format!(
            "Invalid slug '{}': must be lowercase-hyphenated",
            slug
        )))
    }
}

/// Service for the process-stage master registry
#[derive(Clone)]
pub struct ProcessService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProcessService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_process(
        &self,
        input: CreateProcessInput,
    ) -> Result<process::Model, ServiceError> {
        validate_slug(&input.slug)?;
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Process name must not be empty".to_string(),
            ));
        }

        let model = process::ActiveModel {
            id: Set(Uuid::new_v4()),
            slug: Set(input.slug),
            name: Set(input.name),
            description: Set(input.description),
            sequence: Set(input.sequence.unwrap_or(0)),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::ProcessCreated(created.id))
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_process(&self, id: Uuid) -> Result<process::Model, ServiceError> {
        ProcessEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Process {} not found", id)))
    }

    /// Lists processes in sequence order. `active_only` narrows to the
    /// stages currently usable for new batches.
    #[instrument(skip(self))]
    pub async fn list_processes(
        &self,
        active_only: bool,
    ) -> Result<Vec<process::Model>, ServiceError> {
        let mut query = ProcessEntity::find()
            .order_by_asc(process::Column::Sequence)
            .order_by_asc(process::Column::Name);
        if active_only {
            query = query.filter(process::Column::IsActive.eq(true));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_process(
        &self,
        id: Uuid,
        input: UpdateProcessInput,
    ) -> Result<process::Model, ServiceError> {
        let mut model = self.get_process(id).await?;

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Process name must not be empty".to_string(),
                ));
            }
            model.name = name;
        }
        if let Some(description) = input.description {
            model.description = Some(description);
        }
        if let Some(sequence) = input.sequence {
            model.sequence = sequence;
        }
        if let Some(is_active) = input.is_active {
            model.is_active = is_active;
        }

        let updated = model
            .into_active_model()
            .reset_all()
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::ProcessUpdated(updated.id))
            .await;

        Ok(updated)
    }

    /// Marks a process inactive. Processes referenced by batches are
    /// never hard-deleted, so this is the only removal path.
    #[instrument(skip(self))]
    pub async fn deactivate_process(&self, id: Uuid) -> Result<process::Model, ServiceError> {
        self.update_process(
            id,
            UpdateProcessInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Count of batches currently referencing the process, used by the
    /// dashboard and by delete guards.
    #[instrument(skip(self))]
    pub async fn batch_count(&self, id: Uuid) -> Result<u64, ServiceError> {
        Ok(BatchEntity::find()
            .filter(batch::Column::ProcessId.eq(id))
            .count(&*self.db_pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_accepts_lowercase_hyphenated() {
        assert!(validate_slug("hank-winding").is_ok());
        assert!(validate_slug("dyeing-2").is_ok());
        assert!(validate_slug("warping").is_ok());
    }

    #[test]
    fn slug_rejects_malformed_values() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Hank-Winding").is_err());
        assert!(validate_slug("hank winding").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("trailing-").is_err());
        assert!(validate_slug("under_score").is_err());
    }
}
