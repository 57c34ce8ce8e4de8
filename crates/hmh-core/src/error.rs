//! # Error Taxonomy
//!
//! The error surface of the workflow engine. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Propagation policy
//!
//! - `Validation`, `InvalidTransition`, and `PermissionDenied` are detected
//!   before any write; the activity is never mutated when they are returned.
//! - `NotFound` and `Storage` propagate from the document store as-is.
//! - Notification failures have no variant here: a transition whose
//!   notification fails is still a successful transition. Those failures
//!   are traced and swallowed by the dispatcher.

use thiserror::Error;

use crate::role::UserRole;
use crate::status::ActivityStatus;

/// Top-level error type for workflow operations.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// One or more business rules rejected the request. Carries every
    /// violated rule as a human-readable message; callers display the
    /// strings verbatim.
    #[error("validación fallida: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The requested status change is not an edge of the transition table.
    /// A UI offering only legal actions should never produce this.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current activity status.
        from: ActivityStatus,
        /// Attempted target status.
        to: ActivityStatus,
    },

    /// The acting role is not authorized to set the target status.
    #[error("role {role} may not transition an activity to {target}")]
    PermissionDenied {
        /// The acting role.
        role: UserRole,
        /// The target status the role attempted to set.
        target: ActivityStatus,
    },

    /// A referenced document does not resolve in the store.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of document (e.g., "activity", "user").
        kind: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// The underlying document or blob store failed. Partial-write
    /// inconsistency after a storage failure mid-operation is a known
    /// residual risk, not auto-healed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Convenience constructor for a single-message validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_messages() {
        let err = WorkflowError::Validation(vec![
            "Debe seleccionar un cliente".to_string(),
            "El valor debe ser mayor o igual a cero".to_string(),
        ]);
        let rendered = err.to_string();
        assert!(rendered.contains("Debe seleccionar un cliente"));
        assert!(rendered.contains("; "));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = WorkflowError::InvalidTransition {
            from: ActivityStatus::Paid,
            to: ActivityStatus::Assigned,
        };
        assert_eq!(err.to_string(), "invalid status transition: paid -> assigned");
    }
}
