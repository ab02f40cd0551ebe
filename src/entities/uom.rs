use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical dimension a unit of measure belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum UomType {
    #[sea_orm(string_value = "weight")]
    Weight,
    #[sea_orm(string_value = "length")]
    Length,
    #[sea_orm(string_value = "count")]
    Count,
    #[sea_orm(string_value = "volume")]
    Volume,
    #[sea_orm(string_value = "area")]
    Area,
}

impl fmt::Display for UomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UomType::Weight => write!(f, "weight"),
            UomType::Length => write!(f, "length"),
            UomType::Count => write!(f, "count"),
            UomType::Volume => write!(f, "volume"),
            UomType::Area => write!(f, "area"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "uoms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Uppercase convention, e.g. "KG", "CONE"
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub uom_type: UomType,
    /// Decimal places for display/rounding, 0..=6
    pub precision: i16,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
