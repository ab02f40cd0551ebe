use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Sender half of the in-process event channel. Cloned into every
/// service; failures to enqueue are logged rather than failing the
/// originating request.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of propagating channel failures.
    /// Mutations must not fail because the event loop lags.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

/// Creates the bounded event channel wired between services and the
/// background consumer.
pub fn create_event_channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender::new(tx), rx)
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Master data events
    ProcessCreated(Uuid),
    ProcessUpdated(Uuid),
    ItemCreated(Uuid),
    ItemUpdated(Uuid),
    ItemDeactivated(Uuid),
    UomCreated(Uuid),
    UomUpdated(Uuid),
    WorkerCreated(Uuid),
    WorkerUpdated(Uuid),
    WorkerAssignedToProcess {
        worker_id: Uuid,
        process_id: Uuid,
    },
    WorkerUnassignedFromProcess {
        worker_id: Uuid,
        process_id: Uuid,
    },

    // BOM template events
    BomTemplateCreated {
        template_id: Uuid,
        process_id: Uuid,
        component_count: usize,
    },
    BomTemplateUpdated(Uuid),
    BomTemplateComponentsReplaced {
        template_id: Uuid,
        component_count: usize,
    },
    BomTemplateDeleted(Uuid),

    // Batch lifecycle events
    BatchCreated {
        batch_id: Uuid,
        process_id: Uuid,
    },
    BatchUpdated(Uuid),
    BatchStatusChanged {
        batch_id: Uuid,
        old_status: String,
        new_status: String,
    },
    BatchDeleted(Uuid),

    // Ledger events
    MovementRecorded {
        batch_id: Uuid,
        movement_id: Uuid,
    },
    UsageRecorded {
        batch_id: Uuid,
        usage_id: Uuid,
    },

    // Job card workflow events
    JobCardCreated(Uuid),
    JobCardStatusChanged {
        card_id: Uuid,
        old_status: String,
        new_status: String,
    },
    JobCardRerouted {
        card_id: Uuid,
        from_process: String,
        to_process: String,
    },
    ProductionEntryRecorded(Uuid),
}

// Function to process incoming events. Handlers here are log-only; the
// channel exists so mutations stay observable without coupling services
// to each other.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::BatchStatusChanged {
                batch_id,
                old_status,
                new_status,
            } => {
                info!(
                    "Batch {} moved from {} to {}",
                    batch_id, old_status, new_status
                );
            }
            Event::BomTemplateComponentsReplaced {
                template_id,
                component_count,
            } => {
                info!(
                    "BOM template {} components replaced ({} components)",
                    template_id, component_count
                );
            }
            Event::MovementRecorded {
                batch_id,
                movement_id,
            } => {
                info!("Movement {} recorded for batch {}", movement_id, batch_id);
            }
            Event::UsageRecorded { batch_id, usage_id } => {
                info!("Usage {} recorded for batch {}", usage_id, batch_id);
            }
            Event::JobCardRerouted {
                card_id,
                from_process,
                to_process,
            } => {
                info!(
                    "Job card {} rerouted from {} to {}",
                    card_id, from_process, to_process
                );
            }
            other => {
                info!("Event: {:?}", other);
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or error out.
        sender.send_or_log(Event::ProcessCreated(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn events_round_trip_through_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();
        sender
            .send(Event::BatchCreated {
                batch_id: id,
                process_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::BatchCreated { batch_id, .. }) => assert_eq!(batch_id, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
