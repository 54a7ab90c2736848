//! Event bus abstraction for decoupled event emission.
//!
//! Settings, boot restore and the dispatch engine only talk to each other
//! through this trait, so the same code runs against an in-process bus in
//! the daemon and a capturing bus in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Trait for emitting events to subscribers.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name/topic (e.g., "gestures:update_settings")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Handler invoked for every event on a subscribed topic.
pub type EventHandler = Arc<dyn Fn(&serde_json::Value) + Send + Sync + 'static>;

/// In-memory event bus for testing.
///
/// Captures all emitted events for later inspection.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

/// A captured event from InMemoryEventBus.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured events.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Get events for a specific topic.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.events.lock().unwrap().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

/// Process-local publish/subscribe bus.
///
/// Delivery is synchronous on the emitting thread and best-effort: events
/// emitted before a handler subscribes are not replayed.
#[derive(Default)]
pub struct LocalEventBus {
    subscribers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic.
    pub fn subscribe(&self, topic: &str, handler: EventHandler) {
        self.subscribers
            .write()
            .unwrap()
            .entry(topic.to_string())
            .or_default()
            .push(handler);
    }

    /// Number of handlers registered for a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .read()
            .unwrap()
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl EventBus for LocalEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        // Handlers run without the registry lock so they may subscribe or emit.
        let handlers: Vec<EventHandler> = self
            .subscribers
            .read()
            .unwrap()
            .get(topic)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::trace!(topic, "event emitted with no subscribers");
            return;
        }

        for handler in handlers {
            handler(&payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_in_memory_event_bus() {
        let bus = InMemoryEventBus::new();

        bus.emit("gestures:a", json!({"key": "value1"}));
        bus.emit("gestures:b", json!({"key": "value2"}));
        bus.emit("gestures:a", json!({"key": "value3"}));

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.events_for("gestures:a").len(), 2);
        assert_eq!(bus.events_for("gestures:b").len(), 1);
        assert_eq!(bus.events_for("gestures:missing").len(), 0);

        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_local_bus_delivers_to_topic_subscribers_only() {
        let bus = LocalEventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);

        bus.subscribe(
            "gestures:update_settings",
            Arc::new(move |payload: &serde_json::Value| {
                assert_eq!(payload["n"], 1);
                hits_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(bus.subscriber_count("gestures:update_settings"), 1);

        bus.emit("gestures:update_settings", json!({"n": 1}));
        bus.emit("gestures:other", json!({"n": 2}));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_local_bus_handler_may_resubscribe() {
        let bus = Arc::new(LocalEventBus::new());
        let bus_clone = Arc::clone(&bus);

        bus.subscribe(
            "t",
            Arc::new(move |_: &serde_json::Value| {
                bus_clone.subscribe("t2", Arc::new(|_: &serde_json::Value| {}))
            }),
        );
        bus.emit("t", json!(null));

        assert_eq!(bus.subscriber_count("t2"), 1);
    }

    #[test]
    fn test_null_event_bus() {
        NullEventBus.emit("gestures:event", json!({"data": "ignored"}));
    }
}
