//! Ordered workflow events.
//!
//! Events are broadcast with monotonically increasing sequence numbers so
//! observers can order them even when they receive them late.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use updater_core::{ApiChange, UpdatePhase};
use uuid::Uuid;

/// Capacity for the broadcast channel
const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    WorkflowStarted {
        change: ApiChange,
        max_retries: u32,
    },
    PhaseStarted {
        phase: UpdatePhase,
        attempt: u32,
    },
    PhaseSucceeded {
        phase: UpdatePhase,
    },
    PhaseFailed {
        phase: UpdatePhase,
        attempt: u32,
        error: String,
        next_phase: UpdatePhase,
    },
    WorkflowCompleted {
        modified_files: Vec<String>,
    },
    WorkflowFailed {
        attempts: u32,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: WorkflowEvent,
}

/// Broadcast emitter with sequence number guarantees.
///
/// Clones share the channel and the sequence counter.
#[derive(Clone)]
pub struct WorkflowEventEmitter {
    sender: broadcast::Sender<EventEnvelope>,
    sequence: Arc<AtomicU64>,
}

impl WorkflowEventEmitter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Events emitted before subscribing are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Emit an event with the next sequence number and return that number.
    ///
    /// With no subscribers the event is dropped but still consumes a number.
    pub fn emit(&self, run_id: Uuid, event: WorkflowEvent) -> u64 {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence,
            run_id,
            timestamp: Utc::now(),
            event,
        };
        let _ = self.sender.send(envelope);
        sequence
    }

    /// Number of events emitted so far.
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

impl Default for WorkflowEventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorkflowEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEventEmitter")
            .field("subscriber_count", &self.sender.receiver_count())
            .field("sequence", &self.current_sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_increments() {
        let emitter = WorkflowEventEmitter::new();
        let run_id = Uuid::new_v4();

        assert_eq!(emitter.current_sequence(), 0);
        let first = emitter.emit(
            run_id,
            WorkflowEvent::PhaseSucceeded {
                phase: UpdatePhase::Analysis,
            },
        );
        let second = emitter.emit(
            run_id,
            WorkflowEvent::PhaseSucceeded {
                phase: UpdatePhase::Implementation,
            },
        );

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(emitter.current_sequence(), 2);
    }

    #[test]
    fn test_clone_shares_sequence() {
        let emitter1 = WorkflowEventEmitter::new();
        let emitter2 = emitter1.clone();
        let run_id = Uuid::new_v4();

        emitter1.emit(
            run_id,
            WorkflowEvent::WorkflowCompleted {
                modified_files: vec![],
            },
        );
        emitter2.emit(
            run_id,
            WorkflowEvent::WorkflowCompleted {
                modified_files: vec![],
            },
        );
        assert_eq!(emitter1.current_sequence(), 2);
        assert_eq!(emitter2.current_sequence(), 2);
    }

    #[tokio::test]
    async fn test_subscriber_receives_envelopes_in_order() {
        let emitter = WorkflowEventEmitter::with_capacity(8);
        let mut rx = emitter.subscribe();
        let run_id = Uuid::new_v4();

        emitter.emit(
            run_id,
            WorkflowEvent::PhaseStarted {
                phase: UpdatePhase::Analysis,
                attempt: 0,
            },
        );
        emitter.emit(
            run_id,
            WorkflowEvent::PhaseSucceeded {
                phase: UpdatePhase::Analysis,
            },
        );

        let a = rx.recv().await.unwrap();
        let b = rx.recv().await.unwrap();
        assert_eq!(a.sequence, 0);
        assert_eq!(b.sequence, 1);
        assert_eq!(a.run_id, run_id);
        assert!(matches!(b.event, WorkflowEvent::PhaseSucceeded { .. }));
    }

    #[test]
    fn test_event_serialization_tag() {
        let json = serde_json::to_value(WorkflowEvent::PhaseFailed {
            phase: UpdatePhase::Validation,
            attempt: 1,
            error: "validation: boom".to_string(),
            next_phase: UpdatePhase::Implementation,
        })
        .unwrap();
        assert_eq!(json["type"], "phase_failed");
        assert_eq!(json["next_phase"], "implementation");
    }
}
