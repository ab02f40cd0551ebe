use crate::{
    db::DbPool,
    entities::{
        process, process::Entity as ProcessEntity, worker, worker::Entity as WorkerEntity,
        worker::WorkerStatus, worker_process, worker_process::Entity as WorkerProcessEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateWorkerInput {
    pub code: String,
    pub display_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub shift: Option<String>,
    pub contact: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateWorkerInput {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub shift: Option<String>,
    pub status: Option<WorkerStatus>,
    pub contact: Option<String>,
    pub skills: Option<Vec<String>>,
}

fn skills_to_json(skills: Vec<String>) -> serde_json::Value {
    serde_json::Value::Array(skills.into_iter().map(serde_json::Value::String).collect())
}

/// Service for the worker master registry and worker-to-process
/// allocations
#[derive(Clone)]
pub struct WorkerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl WorkerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_worker(
        &self,
        input: CreateWorkerInput,
    ) -> Result<worker::Model, ServiceError> {
        if input.code.trim().is_empty() || input.display_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Worker code and display_name are required".to_string(),
            ));
        }

        let model = worker::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            display_name: Set(input.display_name),
            role: Set(input.role),
            department: Set(input.department),
            shift: Set(input.shift),
            status: Set(WorkerStatus::Active),
            contact: Set(input.contact),
            skills: Set(input.skills.map(skills_to_json)),
            created_at: Set(Utc::now()),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::WorkerCreated(created.id))
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_worker(&self, id: Uuid) -> Result<worker::Model, ServiceError> {
        WorkerEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Worker {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_workers(
        &self,
        status: Option<WorkerStatus>,
    ) -> Result<Vec<worker::Model>, ServiceError> {
        let mut query = WorkerEntity::find().order_by_asc(worker::Column::Code);
        if let Some(status) = status {
            query = query.filter(worker::Column::Status.eq(status));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_worker(
        &self,
        id: Uuid,
        input: UpdateWorkerInput,
    ) -> Result<worker::Model, ServiceError> {
        let mut model = self.get_worker(id).await?;

        if let Some(display_name) = input.display_name {
            model.display_name = display_name;
        }
        if let Some(role) = input.role {
            model.role = Some(role);
        }
        if let Some(department) = input.department {
            model.department = Some(department);
        }
        if let Some(shift) = input.shift {
            model.shift = Some(shift);
        }
        if let Some(status) = input.status {
            model.status = status;
        }
        if let Some(contact) = input.contact {
            model.contact = Some(contact);
        }
        if let Some(skills) = input.skills {
            model.skills = Some(skills_to_json(skills));
        }

        let updated = model
            .into_active_model()
            .reset_all()
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::WorkerUpdated(updated.id))
            .await;

        Ok(updated)
    }

    /// Allocates a worker to a process stage. Re-allocating an existing
    /// pair surfaces as a conflict via the composite primary key.
    #[instrument(skip(self))]
    pub async fn assign_to_process(
        &self,
        worker_id: Uuid,
        process_id: Uuid,
    ) -> Result<(), ServiceError> {
        // Point lookups first so a missing id reads as 404, not FK 409.
        self.get_worker(worker_id).await?;
        ProcessEntity::find_by_id(process_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Process {} not found", process_id)))?;

        let link = worker_process::ActiveModel {
            worker_id: Set(worker_id),
            process_id: Set(process_id),
            assigned_at: Set(Utc::now()),
        };
        link.insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::WorkerAssignedToProcess {
                worker_id,
                process_id,
            })
            .await;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unassign_from_process(
        &self,
        worker_id: Uuid,
        process_id: Uuid,
    ) -> Result<(), ServiceError> {
        let link = WorkerProcessEntity::find_by_id((worker_id, process_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Worker {} is not allocated to process {}",
                    worker_id, process_id
                ))
            })?;

        link.delete(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::WorkerUnassignedFromProcess {
                worker_id,
                process_id,
            })
            .await;

        Ok(())
    }

    /// Processes the worker is currently allocated to, in sequence order.
    #[instrument(skip(self))]
    pub async fn allocated_processes(
        &self,
        worker_id: Uuid,
    ) -> Result<Vec<process::Model>, ServiceError> {
        let worker = self.get_worker(worker_id).await?;
        Ok(worker
            .find_related(ProcessEntity)
            .order_by_asc(process::Column::Sequence)
            .all(&*self.db_pool)
            .await?)
    }
}
