//! Terminal placement determination.
//!
//! Once every bracket match is terminal, the engine computes winner,
//! runner-up, and third place. The final match decides the top two when it
//! can; otherwise a strict tie-break cascade runs, and every rule's input
//! and outcome is recorded on the result's audit trail.

mod audit;
mod engine;
mod errors;
pub mod events;
mod result;

pub use audit::{Placement, TieBreakAudit, TieBreakOutcome, TieBreakRule};
pub use engine::WinnerDeterminationEngine;
pub use errors::DeterminationError;
pub use result::{DeterminationMethod, TournamentResult};
