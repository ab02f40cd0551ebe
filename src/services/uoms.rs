use crate::{
    db::DbPool,
    entities::{uom, uom::Entity as UomEntity, uom::UomType},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

const MAX_PRECISION: i16 = 6;

#[derive(Debug, Clone)]
pub struct CreateUomInput {
    pub code: String,
    pub name: String,
    pub uom_type: UomType,
    pub precision: i16,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUomInput {
    pub name: Option<String>,
    pub uom_type: Option<UomType>,
    pub precision: Option<i16>,
    pub is_active: Option<bool>,
}

fn validate_precision(precision: i16) -> Result<(), ServiceError> {
    if (0..=MAX_PRECISION).contains(&precision) {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(format!(
            "precision must be between 0 and {}, got {}",
            MAX_PRECISION, precision
        )))
    }
}

/// Service for the unit-of-measure master registry
#[derive(Clone)]
pub struct UomService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl UomService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Codes follow the uppercase convention ("KG", "CONE") and are
    /// normalized on the way in.
    #[instrument(skip(self, input))]
    pub async fn create_uom(&self, input: CreateUomInput) -> Result<uom::Model, ServiceError> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "UOM code and name are required".to_string(),
            ));
        }
        validate_precision(input.precision)?;

        let model = uom::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code.trim().to_uppercase()),
            name: Set(input.name),
            uom_type: Set(input.uom_type),
            precision: Set(input.precision),
            is_active: Set(true),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_db)?;

        self.event_sender
            .send_or_log(Event::UomCreated(created.id))
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_uom(&self, id: Uuid) -> Result<uom::Model, ServiceError> {
        UomEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("UOM {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_uoms(&self, active_only: bool) -> Result<Vec<uom::Model>, ServiceError> {
        let mut query = UomEntity::find().order_by_asc(uom::Column::Code);
        if active_only {
            query = query.filter(uom::Column::IsActive.eq(true));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_uom(
        &self,
        id: Uuid,
        input: UpdateUomInput,
    ) -> Result<uom::Model, ServiceError> {
        let mut model = self.get_uom(id).await?;

        if let Some(name) = input.name {
            model.name = name;
        }
        if let Some(uom_type) = input.uom_type {
            model.uom_type = uom_type;
        }
        if let Some(precision) = input.precision {
            validate_precision(precision)?;
            model.precision = precision;
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
            .send_or_log(Event::UomUpdated(updated.id))
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_bounds() {
        assert!(validate_precision(0).is_ok());
        assert!(validate_precision(6).is_ok());
        assert!(validate_precision(-1).is_err());
        assert!(validate_precision(7).is_err());
    }
}
