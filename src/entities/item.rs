use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Item availability status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Active => write!(f, "active"),
            ItemStatus::Inactive => write!(f, "inactive"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    /// UOM code this item is measured in
    pub unit: String,
    pub unit_cost: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub status: ItemStatus,
    pub vendor: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bom_template_item::Entity")]
    BomTemplateItems,
    #[sea_orm(has_many = "super::bom_usage::Entity")]
    BomUsages,
}

impl Related<super::bom_template_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomTemplateItems.def()
    }
}

impl Related<super::bom_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomUsages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
