//! Match lifecycle domain.
//!
//! A match is the single-writer aggregate at the center of the core: every
//! state change flows through its guarded methods, and every successful
//! change yields exactly one domain event for the broadcast layer.

mod aggregate;
mod errors;
pub mod events;
mod state;

pub use aggregate::{CheckInOutcome, Match, MatchScore, Side};
pub use errors::MatchError;
pub use state::MatchState;
