use crate::{
    db::DbPool,
    entities::{
        bom_template, bom_template::Entity as BomTemplateEntity, bom_template_item,
        bom_template_item::Entity as BomTemplateItemEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::movements::resolve_limit,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// One component row as submitted by the caller
#[derive(Debug, Clone)]
pub struct ComponentInput {
    pub item_id: Uuid,
    pub expected_quantity: Decimal,
    pub unit: String,
    /// Display/consumption order; defaults to the array index
    pub position: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct CreateBomTemplateInput {
    pub code: String,
    pub name: String,
    pub process_id: Uuid,
    pub output_item_id: Option<Uuid>,
    pub output_quantity: Option<Decimal>,
    pub instructions: Option<String>,
    pub components: Vec<ComponentInput>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBomTemplateInput {
    pub name: Option<String>,
    pub output_item_id: Option<Uuid>,
    pub output_quantity: Option<Decimal>,
    pub instructions: Option<String>,
    pub is_active: Option<bool>,
    /// When present the stored component set is replaced wholesale
    pub components: Option<Vec<ComponentInput>>,
}

#[derive(Debug, Clone, Default)]
pub struct BomTemplateFilter {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// Template plus its ordered component rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomTemplateDetail {
    #[serde(flatten)]
    pub template: bom_template::Model,
    pub components: Vec<bom_template_item::Model>,
}

fn validate_components(components: &[ComponentInput]) -> Result<(), ServiceError> {
    for (idx, component) in components.iter().enumerate() {
        if component.expected_quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Component {} has non-positive expected_quantity {}",
                idx, component.expected_quantity
            )));
        }
        if component.unit.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Component {} is missing a unit",
                idx
            )));
        }
    }
    Ok(())
}

async fn insert_components<C: ConnectionTrait>(
    conn: &C,
    template_id: Uuid,
    components: Vec<ComponentInput>,
) -> Result<usize, ServiceError> {
    let count = components.len();
    for (idx, component) in components.into_iter().enumerate() {
        let row = bom_template_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            bom_template_id: Set(template_id),
            component_item_id: Set(component.item_id),
            expected_quantity: Set(component.expected_quantity),
            unit: Set(component.unit),
            position: Set(component.position.unwrap_or(idx as i32)),
        };
        row.insert(conn).await.map_err(ServiceError::from_db)?;
    }
    Ok(count)
}

/// Service for BOM templates and their component lists
#[derive(Clone)]
pub struct BomTemplateService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl BomTemplateService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a template with its initial component list in one
    /// transaction.
    #[instrument(skip(self, input))]
    pub async fn create_template(
        &self,
        input: CreateBomTemplateInput,
    ) -> Result<BomTemplateDetail, ServiceError> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "BOM template code and name are required".to_string(),
            ));
        }
        validate_components(&input.components)?;

        let txn = self.db_pool.begin().await?;

        let now = Utc::now();
        let template = bom_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            name: Set(input.name),
            process_id: Set(input.process_id),
            output_item_id: Set(input.output_item_id),
            output_quantity: Set(input.output_quantity),
            instructions: Set(input.instructions),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let template = template.insert(&txn).await.map_err(ServiceError::from_db)?;

        let component_count = insert_components(&txn, template.id, input.components).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::BomTemplateCreated {
                template_id: template.id,
                process_id: template.process_id,
                component_count,
            })
            .await;

        self.get_template(template.id).await
    }

    /// Fetches a template with components ordered by position.
    #[instrument(skip(self))]
    pub async fn get_template(&self, id: Uuid) -> Result<BomTemplateDetail, ServiceError> {
        let template = BomTemplateEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("BOM template {} not found", id)))?;

        let components = BomTemplateItemEntity::find()
            .filter(bom_template_item::Column::BomTemplateId.eq(id))
            .order_by_asc(bom_template_item::Column::Position)
            .all(&*self.db_pool)
            .await?;

        Ok(BomTemplateDetail {
            template,
            components,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_templates(
        &self,
        filter: BomTemplateFilter,
        page: u64,
        limit: Option<u64>,
    ) -> Result<(Vec<bom_template::Model>, u64), ServiceError> {
        let limit = resolve_limit(limit);
        let page = page.max(1) - 1;

        let mut query = BomTemplateEntity::find().order_by_desc(bom_template::Column::CreatedAt);
        if let Some(is_active) = filter.is_active {
            query = query.filter(bom_template::Column::IsActive.eq(is_active));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let needle = search.trim().to_string();
            query = query.filter(
                Condition::any()
                    .add(bom_template::Column::Code.contains(&needle))
                    .add(bom_template::Column::Name.contains(&needle)),
            );
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page).await?;
        Ok((models, total))
    }

    /// Applies a partial update. When `components` is present the
    /// stored set is replaced wholesale: delete all rows for this
    /// template, then insert the submitted set, inside one transaction
    /// so a mid-flight failure leaves the original set intact.
    #[instrument(skip(self, input))]
    pub async fn update_template(
        &self,
        id: Uuid,
        input: UpdateBomTemplateInput,
    ) -> Result<BomTemplateDetail, ServiceError> {
        if let Some(components) = &input.components {
            validate_components(components)?;
        }

        let mut model = BomTemplateEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("BOM template {} not found", id)))?;

        if let Some(name) = input.name {
            model.name = name;
        }
        if let Some(output_item_id) = input.output_item_id {
            model.output_item_id = Some(output_item_id);
        }
        if let Some(output_quantity) = input.output_quantity {
            model.output_quantity = Some(output_quantity);
        }
        if let Some(instructions) = input.instructions {
            model.instructions = Some(instructions);
        }
        if let Some(is_active) = input.is_active {
            model.is_active = is_active;
        }
        model.updated_at = Utc::now();

        let txn = self.db_pool.begin().await?;

        model
            .into_active_model()
            .reset_all()
            .update(&txn)
            .await
            .map_err(ServiceError::from_db)?;

        let replaced = if let Some(components) = input.components {
            // Order matters: old rows must be gone before the new set
            // lands, and both statements commit or neither does.
            BomTemplateItemEntity::delete_many()
                .filter(bom_template_item::Column::BomTemplateId.eq(id))
                .exec(&txn)
                .await?;
            Some(insert_components(&txn, id, components).await?)
        } else {
            None
        };

        txn.commit().await?;

        if let Some(component_count) = replaced {
            self.event_sender
                .send_or_log(Event::BomTemplateComponentsReplaced {
                    template_id: id,
                    component_count,
                })
                .await;
        } else {
            self.event_sender
                .send_or_log(Event::BomTemplateUpdated(id))
                .await;
        }

        self.get_template(id).await
    }

    /// Hard delete. A template still referenced by a batch fails the
    /// FK constraint, surfaced as a conflict; callers are expected to
    /// deactivate used templates instead.
    #[instrument(skip(self))]
    pub async fn delete_template(&self, id: Uuid) -> Result<(), ServiceError> {
        BomTemplateEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("BOM template {} not found", id)))?;

        let txn = self.db_pool.begin().await?;
        BomTemplateItemEntity::delete_many()
            .filter(bom_template_item::Column::BomTemplateId.eq(id))
            .exec(&txn)
            .await?;
        BomTemplateEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_db)?;
        txn.commit().await.map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::BomTemplateDeleted(id))
            .await;

        Ok(())
    }
}
