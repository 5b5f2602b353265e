//! Application services.
//!
//! Each service orchestrates one slice of the system: load aggregates
//! through the repository ports, run the domain guards, persist, then
//! publish events best-effort. Event publishing never rolls back a
//! persisted state change.

pub mod admission;
pub mod bracket_progression;
pub mod dispute_workflow;
pub mod error;
pub mod match_lifecycle;
pub mod winner_determination;

pub use admission::{AdmissionController, AdmissionDecision, DenyReason};
pub use bracket_progression::BracketProgressionService;
pub use dispute_workflow::{DisputeWorkflow, ResolveCommand};
pub use error::ServiceError;
pub use match_lifecycle::MatchLifecycleController;
pub use winner_determination::WinnerDeterminationService;
