//! EventSubscriber port.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainEvent, EventKind};

/// Result handlers return; the error is carried only for logging.
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Handler for processing domain events.
///
/// Handlers must be idempotent (delivery is at-least-once) and quick;
/// anything slow belongs on a task the handler spawns. A handler error is
/// logged by the bus and never affects other handlers.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Processes one event.
    async fn handle(&self, event: &DomainEvent) -> HandlerResult;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
pub trait EventSubscriber: Send + Sync {
    /// Subscribes a handler to one event kind.
    fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>);

    /// Subscribes a handler to several kinds at once.
    fn subscribe_all(&self, kinds: &[EventKind], handler: Arc<dyn EventHandler>);
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
