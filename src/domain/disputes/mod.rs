//! Dispute records and their review workflow state.
//!
//! A dispute contests a pending match result. Opening one moves the match
//! to `Disputed`; resolving it applies exactly one of the four decisions
//! back onto the match. At most one unresolved dispute exists per match;
//! the repository enforces that uniqueness.

mod aggregate;
mod errors;
pub mod events;
mod status;

pub use aggregate::{Dispute, DisputeDecision, DisputeReason, Resolution};
pub use errors::DisputeError;
pub use status::DisputeStatus;
