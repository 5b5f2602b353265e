//! Shared kernel for the domain layer.
//!
//! Strongly-typed identifiers, timestamps, the state-machine trait that all
//! lifecycle enums implement, role ordering, and the domain event types that
//! flow from the controllers to the broadcast layer.

mod auth;
mod errors;
mod events;
mod ids;
mod role;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, CallerIdentity};
pub use errors::{ConflictError, ValidationError};
pub use events::{DomainEvent, EventId, EventKind};
pub use ids::{DisputeId, MatchId, ParticipantId, RoomId, SessionId, TournamentId, UserId};
pub use role::Role;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
