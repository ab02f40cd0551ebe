use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of actual material consumption for a batch.
/// expected_quantity is a snapshot taken at record time and is never
/// re-derived from the template; variance (actual - expected) is
/// computed on read, never stored.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bom_usages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub batch_id: Uuid,
    pub item_id: Uuid,
    pub expected_quantity: Option<Decimal>,
    pub actual_quantity: Decimal,
    pub unit: String,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl Model {
    /// Derived variance against the snapshot, when one was taken.
    pub fn variance(&self) -> Option<Decimal> {
        self.expected_quantity
            .map(|expected| self.actual_quantity - expected)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::batch::Entity",
        from = "Column::BatchId",
        to = "super::batch::Column::Id"
    )]
    Batch,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn variance_is_actual_minus_expected() {
        let usage = Model {
            id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            expected_quantity: Some(dec!(10)),
            actual_quantity: dec!(12.5),
            unit: "KG".into(),
            notes: None,
            recorded_by: None,
            recorded_at: Utc::now(),
        };
        assert_eq!(usage.variance(), Some(dec!(2.5)));
    }

    #[test]
    fn variance_is_none_without_snapshot() {
        let usage = Model {
            id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            expected_quantity: None,
            actual_quantity: dec!(3),
            unit: "KG".into(),
            notes: None,
            recorded_by: None,
            recorded_at: Utc::now(),
        };
        assert_eq!(usage.variance(), None);
    }
}
