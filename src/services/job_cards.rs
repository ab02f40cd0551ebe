use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::instrument;
use uuid::Uuid;

/// Linear workflow order, index 0..=3.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
    utoipa::ToSchema,
)]
pub enum JobCardStatus {
    Received,
    #[strum(serialize = "In Production")]
    #[serde(rename = "In Production")]
    InProduction,
    Quality,
    Completed,
}

impl JobCardStatus {
    pub fn index(&self) -> usize {
        JobCardStatus::iter()
            .position(|s| s == *self)
            .unwrap_or_default()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        JobCardStatus::iter().nth(index)
    }

    pub fn last_index() -> usize {
        JobCardStatus::iter().count() - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionType {
    Status,
    Reroute,
    Production,
}

/// One immutable audit entry. The list on a card is prepended, so
/// index 0 is always the most recent event.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JobCardTransaction {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub from_status: Option<JobCardStatus>,
    pub to_status: Option<JobCardStatus>,
    pub from_process: Option<String>,
    pub to_process: Option<String>,
    pub weight_in: Option<Decimal>,
    pub weight_out: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JobCard {
    pub id: Uuid,
    pub output_item: String,
    pub quantity: Option<Decimal>,
    /// Current process stage name
    pub current_stage: String,
    pub next_action: Option<String>,
    pub instructions: Option<String>,
    /// Ordered free-text tags; duplicates allowed
    pub requirements: Vec<String>,
    pub status: JobCardStatus,
    pub created_on: DateTime<Utc>,
    pub transactions: Vec<JobCardTransaction>,
}

#[derive(Debug, Clone)]
pub struct CreateJobCardInput {
    pub output_item: String,
    pub quantity: Option<Decimal>,
    pub current_stage: String,
    pub next_action: Option<String>,
    pub instructions: Option<String>,
    pub requirements: Vec<String>,
}

/// Short-lived value object carried from a transition request to its
/// confirmation. Never persisted on the card.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PendingTransition {
    pub card_id: Uuid,
    pub from_status: JobCardStatus,
    pub to_status: JobCardStatus,
    pub from_process: String,
    pub to_process: String,
}

/// Optional operator-entered fields attached at confirmation time
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConfirmationDetails {
    pub weight_in: Option<Decimal>,
    pub weight_out: Option<Decimal>,
    pub notes: Option<String>,
}

/// Operator-facing job card workflow. Cards live in process memory,
/// not the relational store, so the whole service is a concurrent map
/// keyed by card id.
#[derive(Clone)]
pub struct JobCardService {
    cards: Arc<DashMap<Uuid, JobCard>>,
    event_sender: Arc<EventSender>,
}

impl JobCardService {
    pub fn new(event_sender: Arc<EventSender>) -> Self {
        Self {
            cards: Arc::new(DashMap::new()),
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_card(&self, input: CreateJobCardInput) -> Result<JobCard, ServiceError> {
        if input.output_item.trim().is_empty() || input.current_stage.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Job card output_item and current_stage are required".to_string(),
            ));
        }

        let card = JobCard {
            id: Uuid::new_v4(),
            output_item: input.output_item,
            quantity: input.quantity,
            current_stage: input.current_stage,
            next_action: input.next_action,
            instructions: input.instructions,
            requirements: input.requirements,
            status: JobCardStatus::Received,
            created_on: Utc::now(),
            transactions: Vec::new(),
        };

        self.cards.insert(card.id, card.clone());
        self.event_sender
            .send_or_log(Event::JobCardCreated(card.id))
            .await;
        Ok(card)
    }

    #[instrument(skip(self))]
    pub fn get_card(&self, id: Uuid) -> Result<JobCard, ServiceError> {
        self.cards
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", id)))
    }

    #[instrument(skip(self))]
    pub fn list_cards(&self) -> Vec<JobCard> {
        let mut cards: Vec<JobCard> = self.cards.iter().map(|entry| entry.clone()).collect();
        cards.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        cards
    }

    /// Requests a move one step forward or backward along the linear
    /// order. Returns `None` at a boundary (no state change, nothing
    /// appended); otherwise returns the pending transition the caller
    /// must confirm before anything mutates.
    #[instrument(skip(self))]
    pub fn advance_status(
        &self,
        id: Uuid,
        direction: i8,
    ) -> Result<Option<PendingTransition>, ServiceError> {
        if !matches!(direction, 1 | -1) {
            return Err(ServiceError::ValidationError(
                "direction must be +1 or -1".to_string(),
            ));
        }
        let card = self.get_card(id)?;

        let current = card.status.index() as i64;
        let next = (current + direction as i64).clamp(0, JobCardStatus::last_index() as i64);
        if next == current {
            return Ok(None);
        }
        let to_status = JobCardStatus::from_index(next as usize).ok_or_else(|| {
            ServiceError::InternalError(format!("No status at index {}", next))
        })?;

        Ok(Some(PendingTransition {
            card_id: id,
            from_status: card.status,
            to_status,
            // Status changes stay on the current stage by default.
            from_process: card.current_stage.clone(),
            to_process: card.current_stage.clone(),
        }))
    }

    /// Confirms a previously requested status change: appends a
    /// `status` transaction and overwrites the card's live status and
    /// stage from the transition's `to*` fields.
    #[instrument(skip(self, pending, details))]
    pub async fn confirm_status_change(
        &self,
        pending: PendingTransition,
        details: ConfirmationDetails,
    ) -> Result<JobCard, ServiceError> {
        let card_id = pending.card_id;
        let updated = {
            let mut entry = self.cards.get_mut(&card_id).ok_or_else(|| {
                ServiceError::NotFound(format!("Job card {} not found", card_id))
            })?;
            // The card moved under a stale confirmation.
            if entry.status != pending.from_status {
                return Err(ServiceError::ConcurrentModification(card_id));
            }

            entry.transactions.insert(
                0,
                JobCardTransaction {
                    timestamp: Utc::now(),
                    kind: TransactionType::Status,
                    from_status: Some(pending.from_status),
                    to_status: Some(pending.to_status),
                    from_process: Some(pending.from_process.clone()),
                    to_process: Some(pending.to_process.clone()),
                    weight_in: details.weight_in,
                    weight_out: details.weight_out,
                    notes: details.notes,
                },
            );
            entry.status = pending.to_status;
            entry.current_stage = pending.to_process;
            entry.clone()
        };

        self.event_sender
            .send_or_log(Event::JobCardStatusChanged {
                card_id,
                old_status: pending.from_status.to_string(),
                new_status: pending.to_status.to_string(),
            })
            .await;

        Ok(updated)
    }

    /// Reroutes a completed card to a different process stage. Blocked
    /// while the destination equals the origin.
    #[instrument(skip(self, details))]
    pub async fn record_reroute(
        &self,
        id: Uuid,
        to_process: String,
        details: ConfirmationDetails,
    ) -> Result<JobCard, ServiceError> {
        let (updated, from_process) = {
            let mut entry = self
                .cards
                .get_mut(&id)
                .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", id)))?;

            if entry.status != JobCardStatus::Completed {
                return Err(ServiceError::InvalidOperation(format!(
                    "Job card {} is {}, only completed cards can be rerouted",
                    id, entry.status
                )));
            }
            if entry.current_stage == to_process {
                return Err(ServiceError::ValidationError(
                    "Reroute destination must differ from the current stage".to_string(),
                ));
            }

            let from_process = entry.current_stage.clone();
            let status = entry.status;
            entry.transactions.insert(
                0,
                JobCardTransaction {
                    timestamp: Utc::now(),
                    kind: TransactionType::Reroute,
                    from_status: Some(status),
                    to_status: Some(status),
                    from_process: Some(from_process.clone()),
                    to_process: Some(to_process.clone()),
                    weight_in: details.weight_in,
                    weight_out: details.weight_out,
                    notes: details.notes,
                },
            );
            entry.current_stage = to_process.clone();
            (entry.clone(), from_process)
        };

        self.event_sender
            .send_or_log(Event::JobCardRerouted {
                card_id: id,
                from_process,
                to_process,
            })
            .await;

        Ok(updated)
    }

    /// Records weights/notes against the card without touching its
    /// status or stage.
    #[instrument(skip(self, details))]
    pub async fn record_production_entry(
        &self,
        id: Uuid,
        details: ConfirmationDetails,
    ) -> Result<JobCard, ServiceError> {
        let updated = {
            let mut entry = self
                .cards
                .get_mut(&id)
                .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", id)))?;

            let stage = entry.current_stage.clone();
            entry.transactions.insert(
                0,
                JobCardTransaction {
                    timestamp: Utc::now(),
                    kind: TransactionType::Production,
                    from_status: None,
                    to_status: None,
                    from_process: Some(stage.clone()),
                    to_process: Some(stage),
                    weight_in: details.weight_in,
                    weight_out: details.weight_out,
                    notes: details.notes,
                },
            );
            entry.clone()
        };

        self.event_sender
            .send_or_log(Event::ProductionEntryRecorded(id))
            .await;

        Ok(updated)
    }

    /// Appends a requirement tag. Duplicates are allowed.
    #[instrument(skip(self))]
    pub fn add_requirement(&self, id: Uuid, requirement: String) -> Result<JobCard, ServiceError> {
        if requirement.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Requirement must not be empty".to_string(),
            ));
        }
        let mut entry = self
            .cards
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", id)))?;
        entry.requirements.push(requirement);
        Ok(entry.clone())
    }

    /// Removes the requirement at `index`.
    #[instrument(skip(self))]
    pub fn remove_requirement(&self, id: Uuid, index: usize) -> Result<JobCard, ServiceError> {
        let mut entry = self
            .cards
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", id)))?;
        if index >= entry.requirements.len() {
            return Err(ServiceError::ValidationError(format!(
                "No requirement at index {}",
                index
            )));
        }
        entry.requirements.remove(index);
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_order_is_linear() {
        assert_eq!(JobCardStatus::Received.index(), 0);
        assert_eq!(JobCardStatus::InProduction.index(), 1);
        assert_eq!(JobCardStatus::Quality.index(), 2);
        assert_eq!(JobCardStatus::Completed.index(), 3);
        assert_eq!(JobCardStatus::last_index(), 3);
        assert_eq!(
            JobCardStatus::from_index(1),
            Some(JobCardStatus::InProduction)
        );
        assert_eq!(JobCardStatus::from_index(4), None);
    }

    #[test]
    fn status_display_matches_wire_form() {
        assert_eq!(JobCardStatus::InProduction.to_string(), "In Production");
        assert_eq!(JobCardStatus::Received.to_string(), "Received");
    }
}
