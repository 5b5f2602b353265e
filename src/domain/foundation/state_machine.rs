//! State machine trait for lifecycle status enums.
//!
//! Both the match lifecycle and the dispute workflow are guarded state
//! machines. Implementors declare the transition table once and get
//! validated transitions and terminal-state detection for free.

use super::ConflictError;

/// Trait for status enums that represent guarded state machines.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Name of the entity this lifecycle belongs to, used in conflict errors.
    const ENTITY: &'static str;

    /// Returns true if a transition from self to target is permitted.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all permitted target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs a validated transition.
    ///
    /// This is the only way lifecycle code changes state; a refused
    /// transition surfaces as a `ConflictError` naming both states.
    fn transition_to(&self, target: Self) -> Result<Self, ConflictError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ConflictError::invalid_transition(
                Self::ENTITY,
                format!("{:?}", self),
                format!("{:?}", target),
            ))
        }
    }

    /// Checks if the current state is terminal (no outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
