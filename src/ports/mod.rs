//! Ports - interfaces between the application core and the outside world.
//!
//! Following hexagonal architecture, ports define the contracts the
//! application services depend on. Adapters implement them: in-memory for
//! tests and single-node runs, Redis for the shared counters.
//!
//! ## Persistence
//!
//! - `MatchRepository`, `BracketRepository`, `DisputeRepository` - aggregate
//!   storage
//! - `ResultRepository` - once-only tournament result storage
//!
//! ## Events
//!
//! - `EventPublisher` - publishing domain events
//! - `EventSubscriber` / `EventHandler` - consuming them
//!
//! ## Admission
//!
//! - `CounterStore` - shared concurrency counters and rate buckets
//! - `TokenVerifier` / `RoleResolver` - authentication at the gateway

mod bracket_repository;
mod counter_store;
mod dispute_repository;
mod event_publisher;
mod event_subscriber;
mod match_repository;
mod result_repository;
mod token_verifier;

pub use bracket_repository::BracketRepository;
pub use counter_store::CounterStore;
pub(crate) use counter_store::keys as counter_keys;
pub use dispute_repository::DisputeRepository;
pub use event_publisher::{EventPublisher, PublishError};
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber, HandlerResult};
pub use match_repository::MatchRepository;
pub use result_repository::ResultRepository;
pub use token_verifier::{RoleResolver, TokenVerifier};

use thiserror::Error;

/// Errors raised by storage-backed ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record already exists: {0}")]
    Duplicate(String),

    /// The backend is unreachable or failing. Callers with a fallback
    /// (the admission controller) may degrade to a local store.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
