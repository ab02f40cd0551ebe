use crate::{
    db::DbPool,
    entities::{
        bom_template_item, bom_template_item::Entity as BomTemplateItemEntity, bom_usage,
        bom_usage::Entity as BomUsageEntity, item, item::Entity as ItemEntity, item::ItemStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateItemInput {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub unit_cost: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub status: Option<ItemStatus>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

/// Filters accepted by the item list endpoint
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub status: Option<ItemStatus>,
    /// Case-insensitive substring match against sku and name
    pub search: Option<String>,
}

/// Service for the item master registry
#[derive(Clone)]
pub struct ItemService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ItemService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_item(&self, input: CreateItemInput) -> Result<item::Model, ServiceError> {
        if input.sku.trim().is_empty() || input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Item sku and name are required".to_string(),
            ));
        }
        if let Some(cost) = input.unit_cost {
            if cost < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "unit_cost must not be negative".to_string(),
                ));
            }
        }

        let model = item::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(input.sku),
            name: Set(input.name),
            category: Set(input.category),
            unit: Set(input.unit),
            unit_cost: Set(input.unit_cost),
            reorder_level: Set(input.reorder_level),
            status: Set(ItemStatus::Active),
            vendor: Set(input.vendor),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::ItemCreated(created.id))
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: Uuid) -> Result<item::Model, ServiceError> {
        ItemEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self, filter: ItemFilter) -> Result<Vec<item::Model>, ServiceError> {
        let mut query = ItemEntity::find().order_by_asc(item::Column::Sku);
        if let Some(status) = filter.status {
            query = query.filter(item::Column::Status.eq(status));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let needle = search.trim().to_string();
            query = query.filter(
                Condition::any()
                    .add(item::Column::Sku.contains(&needle))
                    .add(item::Column::Name.contains(&needle)),
            );
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        id: Uuid,
        input: UpdateItemInput,
    ) -> Result<item::Model, ServiceError> {
        let mut model = self.get_item(id).await?;

        if let Some(name) = input.name {
            model.name = name;
        }
        if let Some(category) = input.category {
            model.category = Some(category);
        }
        if let Some(unit) = input.unit {
            model.unit = unit;
        }
        if let Some(cost) = input.unit_cost {
            if cost < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "unit_cost must not be negative".to_string(),
                ));
            }
            model.unit_cost = Some(cost);
        }
        if let Some(level) = input.reorder_level {
            model.reorder_level = Some(level);
        }
        if let Some(status) = input.status {
            model.status = status;
        }
        if let Some(vendor) = input.vendor {
            model.vendor = Some(vendor);
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

        self.event_sender
            .send_or_log(Event::ItemUpdated(updated.id))
            .await;

        Ok(updated)
    }

    /// Hard delete, blocked while the item is referenced by a BOM
    /// component or a usage record. Callers should deactivate instead
    /// when the guard fires.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: Uuid) -> Result<(), ServiceError> {
        let model = self.get_item(id).await?;

        let component_refs = BomTemplateItemEntity::find()
            .filter(bom_template_item::Column::ComponentItemId.eq(id))
            .count(&*self.db_pool)
            .await?;
        let usage_refs = BomUsageEntity::find()
            .filter(bom_usage::Column::ItemId.eq(id))
            .count(&*self.db_pool)
            .await?;
        if component_refs > 0 || usage_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "Item {} is referenced by {} BOM component(s) and {} usage record(s); deactivate it instead",
                id, component_refs, usage_refs
            )));
        }

        model
            .delete(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;
        Ok(())
    }

    /// The soft removal path the delete guard points at.
    #[instrument(skip(self))]
    pub async fn deactivate_item(&self, id: Uuid) -> Result<item::Model, ServiceError> {
        let updated = self
            .update_item(
                id,
                UpdateItemInput {
                    status: Some(ItemStatus::Inactive),
                    ..Default::default()
                },
            )
            .await?;

        self.event_sender
            .send_or_log(Event::ItemDeactivated(updated.id))
            .await;

        Ok(updated)
    }
}
