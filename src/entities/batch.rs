use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a production batch.
///
/// Forward path: draft -> scheduled -> in_progress <-> paused ->
/// awaiting_qc -> completed. `cancelled` is reachable from any
/// non-terminal state. `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "awaiting_qc")]
    AwaitingQc,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BatchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Cancelled)
    }

    /// Whether a direct transition from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        use BatchStatus::*;
        if *self == next {
            return false;
        }
        match (*self, next) {
            (_, Cancelled) => !self.is_terminal(),
            (Draft, Scheduled) => true,
            (Scheduled, InProgress) => true,
            (InProgress, Paused) => true,
            (Paused, InProgress) => true,
            (InProgress, AwaitingQc) => true,
            (AwaitingQc, Completed) => true,
            _ => false,
        }
    }

    /// Parses the wire form used by the status query filter. Unknown
    /// values map to `None` and are dropped by callers.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "draft" => Some(BatchStatus::Draft),
            "scheduled" => Some(BatchStatus::Scheduled),
            "in_progress" => Some(BatchStatus::InProgress),
            "paused" => Some(BatchStatus::Paused),
            "awaiting_qc" => Some(BatchStatus::AwaitingQc),
            "completed" => Some(BatchStatus::Completed),
            "cancelled" => Some(BatchStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchStatus::Draft => "draft",
            BatchStatus::Scheduled => "scheduled",
            BatchStatus::InProgress => "in_progress",
            BatchStatus::Paused => "paused",
            BatchStatus::AwaitingQc => "awaiting_qc",
            BatchStatus::Completed => "completed",
            BatchStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub process_id: Uuid,
    pub bom_template_id: Option<Uuid>,
    pub status: BatchStatus,
    pub planned_quantity: Option<Decimal>,
    pub input_quantity: Option<Decimal>,
    pub output_quantity: Option<Decimal>,
    /// Stored directly as a percentage, 0-100
    pub wastage_percentage: Option<Decimal>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub supervisor_id: Option<Uuid>,
    pub created_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Derived metric: output / input, undefined when input is zero or
    /// either quantity is absent. Never stored.
    pub fn efficiency(&self) -> Option<Decimal> {
        match (self.output_quantity, self.input_quantity) {
            (Some(output), Some(input)) => output.checked_div(input),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::process::Entity",
        from = "Column::ProcessId",
        to = "super::process::Column::Id"
    )]
    Process,
    #[sea_orm(
        belongs_to = "super::bom_template::Entity",
        from = "Column::BomTemplateId",
        to = "super::bom_template::Column::Id"
    )]
    BomTemplate,
    #[sea_orm(
        belongs_to = "super::worker::Entity",
        from = "Column::SupervisorId",
        to = "super::worker::Column::Id"
    )]
    Supervisor,
    #[sea_orm(has_many = "super::batch_movement::Entity")]
    Movements,
    #[sea_orm(has_many = "super::bom_usage::Entity")]
    Usages,
}

impl Related<super::process::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Process.def()
    }
}

impl Related<super::bom_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomTemplate.def()
    }
}

impl Related<super::worker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supervisor.def()
    }
}

impl Related<super::batch_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl Related<super::bom_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn batch_with_quantities(
        input: Option<Decimal>,
        output: Option<Decimal>,
    ) -> Model {
        Model {
            id: Uuid::new_v4(),
            code: "BCH-1".into(),
            process_id: Uuid::new_v4(),
            bom_template_id: None,
            status: BatchStatus::Scheduled,
            planned_quantity: None,
            input_quantity: input,
            output_quantity: output,
            wastage_percentage: None,
            started_at: None,
            completed_at: None,
            supervisor_id: None,
            created_by: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn efficiency_is_none_without_input() {
        assert_eq!(batch_with_quantities(None, Some(dec!(5))).efficiency(), None);
        assert_eq!(batch_with_quantities(Some(dec!(10)), None).efficiency(), None);
        assert_eq!(
            batch_with_quantities(Some(dec!(0)), Some(dec!(5))).efficiency(),
            None
        );
    }

    #[test]
    fn efficiency_is_exact_ratio() {
        assert_eq!(
            batch_with_quantities(Some(dec!(10)), Some(dec!(8))).efficiency(),
            Some(dec!(0.8))
        );
    }

    #[test]
    fn forward_transitions_are_legal() {
        use BatchStatus::*;
        assert!(Draft.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Paused));
        assert!(Paused.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(AwaitingQc));
        assert!(AwaitingQc.can_transition_to(Completed));
    }

    #[test]
    fn cancel_is_reachable_only_from_non_terminal_states() {
        use BatchStatus::*;
        for status in [Draft, Scheduled, InProgress, Paused, AwaitingQc] {
            assert!(status.can_transition_to(Cancelled), "{} -> cancelled", status);
        }
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn skipping_states_is_rejected() {
        use BatchStatus::*;
        assert!(!Draft.can_transition_to(InProgress));
        assert!(!Scheduled.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Paused.can_transition_to(AwaitingQc));
    }
}
