//! In-memory event bus.
//!
//! Synchronous, deterministic delivery for unit tests and single-node
//! runs: handlers run inline on the publishing task, in registration
//! order, and every published event is captured for assertions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::foundation::{DomainEvent, EventKind};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber, PublishError};

pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<EventKind, Vec<Arc<dyn EventHandler>>>>,
    published: RwLock<Vec<DomainEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    /// All published events, in order. Test helper.
    pub fn published(&self) -> Vec<DomainEvent> {
        self.published.read().expect("bus lock poisoned").clone()
    }

    /// Published events of one kind. Test helper.
    pub fn published_of(&self, kind: EventKind) -> Vec<DomainEvent> {
        self.published()
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }

    /// Drops captured events. Test helper for isolation.
    pub fn clear(&self) {
        self.published.write().expect("bus lock poisoned").clear();
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError> {
        self.published
            .write()
            .expect("bus lock poisoned")
            .push(event.clone());

        // Clone the handler list out so no lock is held across awaits.
        let subscribed: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .expect("bus lock poisoned")
            .get(&event.kind)
            .cloned()
            .unwrap_or_default();

        for handler in subscribed {
            if let Err(error) = handler.handle(&event).await {
                tracing::warn!(handler = handler.name(), %error, kind = %event.kind, "event handler failed");
            }
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .expect("bus lock poisoned")
            .entry(kind)
            .or_default()
            .push(handler);
    }

    fn subscribe_all(&self, kinds: &[EventKind], handler: Arc<dyn EventHandler>) {
        for kind in kinds {
            self.subscribe(*kind, handler.clone());
        }
    }
}
