//! In-memory adapters.
//!
//! Deterministic, lock-based implementations of the ports for unit tests
//! and single-node deployments. They use `.expect()` on lock operations;
//! a poisoned lock panics, which is acceptable here and nowhere else.

mod bracket_repository;
mod counter_store;
mod dispute_repository;
mod event_bus;
mod match_repository;
mod result_repository;
mod role_resolver;

pub use bracket_repository::InMemoryBracketRepository;
pub use counter_store::InMemoryCounterStore;
pub use dispute_repository::InMemoryDisputeRepository;
pub use event_bus::InMemoryEventBus;
pub use match_repository::InMemoryMatchRepository;
pub use result_repository::InMemoryResultRepository;
pub use role_resolver::InMemoryRoleResolver;
