//! EventPublisher port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::DomainEvent;

/// Errors raised while publishing events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// No subscriber is listening; the event was dropped.
    #[error("event channel closed")]
    ChannelClosed,

    #[error("publish failed: {0}")]
    Backend(String),
}

/// Port for publishing domain events.
///
/// Delivery is at-least-once; handlers dedupe on `event_id` when they
/// care. Publishing is best-effort from the controllers' point of view: a
/// failed publish is logged, never rolled back, because the state change
/// has already been persisted.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a single event.
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError>;

    /// Publishes a batch in order. Sequential best-effort; the first
    /// failure is returned.
    async fn publish_all(&self, events: Vec<DomainEvent>) -> Result<(), PublishError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher) {}
}
