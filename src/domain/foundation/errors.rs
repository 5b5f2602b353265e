//! Error types shared across the domain layer.
//!
//! Two families matter everywhere: `ValidationError` (malformed input, the
//! caller's fault, never retried) and `ConflictError` (a state-machine guard
//! refused the transition; safe to resubmit after re-reading state).

use thiserror::Error;

/// Errors raised when input fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("field '{field}' is invalid: {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid field validation error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when a state-machine guard rejects an operation.
///
/// Carries the attempted transition so callers can report exactly which
/// guard failed. Safe to resubmit after re-reading current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity}: cannot transition from {from} to {to}")]
pub struct ConflictError {
    pub entity: &'static str,
    pub from: String,
    pub to: String,
}

impl ConflictError {
    /// Creates a conflict error for an invalid transition.
    pub fn invalid_transition(
        entity: &'static str,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            entity,
            from: from.into(),
            to: to.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_messages_name_the_field() {
        let err = ValidationError::empty_field("reason");
        assert!(err.to_string().contains("reason"));

        let err = ValidationError::out_of_range("round", 1, 32, 0);
        assert!(err.to_string().contains("round"));
        assert!(err.to_string().contains("0"));
    }

    #[test]
    fn conflict_error_names_both_states() {
        let err = ConflictError::invalid_transition("Match", "Live", "Completed");
        let msg = err.to_string();
        assert!(msg.contains("Live"));
        assert!(msg.contains("Completed"));
    }
}
