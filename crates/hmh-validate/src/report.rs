//! # Validation Reports
//!
//! The accumulating result type every rule returns. A report is valid
//! when it carries no error messages; callers must check before
//! proceeding, and the workflow engine converts invalid reports into
//! [`WorkflowError::Validation`] before touching any state.

use serde::{Deserialize, Serialize};

use hmh_core::WorkflowError;

/// The outcome of one validation rule: valid, or a list of human-readable
/// reasons it is not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Every violated rule, in check order. Empty means valid.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// A fresh, valid report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no rule was violated.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a violation.
    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Record a violation when `violated` holds.
    pub fn push_if(&mut self, violated: bool, message: impl Into<String>) {
        if violated {
            self.push(message);
        }
    }

    /// Fold another report's violations into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    /// Convert into the engine's error type: `Ok(())` when valid,
    /// `Err(WorkflowError::Validation)` carrying every message otherwise.
    pub fn into_result(self) -> Result<(), WorkflowError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::Validation(self.errors))
        }
    }

    /// Render the violations as a bulleted display block.
    pub fn format_errors(&self) -> String {
        self.errors.join("\n• ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_violations_accumulate() {
        let mut report = ValidationReport::new();
        report.push("Debe seleccionar un cliente");
        report.push_if(true, "Debe seleccionar un tipo de actividad");
        report.push_if(false, "never recorded");
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_into_result_carries_all_messages() {
        let mut report = ValidationReport::new();
        report.push("uno");
        report.push("dos");
        match report.into_result() {
            Err(WorkflowError::Validation(errors)) => assert_eq!(errors, vec!["uno", "dos"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationReport::new();
        a.push("uno");
        let mut b = ValidationReport::new();
        b.push("dos");
        a.merge(b);
        assert_eq!(a.errors, vec!["uno", "dos"]);
    }

    #[test]
    fn test_format_errors() {
        let mut report = ValidationReport::new();
        report.push("uno");
        report.push("dos");
        assert_eq!(report.format_errors(), "uno\n• dos");
    }
}
