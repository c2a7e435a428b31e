//! Domain event system: decoupled observation of the grounding core.
//!
//! The generation controller and live configurator publish what they did;
//! rendering surfaces and diagnostics subscribe without tight coupling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A generation request entered a new lifecycle stage
    StageAdvanced {
        request_id: String,
        stage: String,
        timestamp: DateTime<Utc>,
    },

    /// A generation request finished streaming
    GenerationCompleted {
        request_id: String,
        latency_ms: u64,
        output_chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// A generation request failed
    GenerationFailed {
        request_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// Conversational memory could not be persisted
    MemoryWriteFailed {
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// A live session configuration was pushed to the transport
    LiveConfigPushed {
        revision: u64,
        timestamp: DateTime<Utc>,
    },

    /// The scripted opening turn was sent on a connect edge
    GreetingSent {
        language: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::GenerationCompleted {
            request_id: "r1".into(),
            latency_ms: 42,
            output_chars: 7,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::GenerationCompleted { request_id, latency_ms, .. } => {
                assert_eq!(request_id, "r1");
                assert_eq!(*latency_ms, 42);
            }
            _ => panic!("Expected GenerationCompleted event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::MemoryWriteFailed {
            error_message: "disk full".into(),
            timestamp: Utc::now(),
        });
    }
}
