//! # hmh-validate — Business Validation Rules
//!
//! Stateless predicate functions, one per business rule. Business rules
//! return a [`ValidationReport`] rather than an error: violations
//! **accumulate**, they never short-circuit, so a caller can show every
//! problem at once. The one exception is the status-change guard, which
//! reports its two structural violations as the dedicated
//! `InvalidTransition` and `PermissionDenied` error variants.
//! Nothing in this crate performs I/O — every rule is directly unit
//! testable without a document store, and the workflow engine passes in
//! whatever context a rule needs (today's date, the existing assignment
//! rows, the acting role).
//!
//! User-facing messages are Spanish, displayed verbatim by the caller.
//!
//! ## Rule inventory
//!
//! - [`client::validate_client_data`] — client record completeness.
//! - [`consultant::validate_consultant_data`] — consultant profile completeness.
//! - [`consultant::validate_consultant_rate`] — rate table entries.
//! - [`activity::validate_activity_creation`] — creation completeness.
//! - [`activity::validate_activity_assignment`] — allocation preconditions,
//!   including the ≤100% sum invariant.
//! - [`activity::validate_status_change`] — transition-table and
//!   role-matrix legality as pure lookups, surfaced as typed errors.
//! - [`activity::validate_activity_finalization`] — executed units and
//!   mandatory supports.
//! - [`activity::validate_activity_approval`] — approval preconditions.
//! - [`billing::validate_billing_request`] — billing preconditions.
//! - [`billing::validate_receivable_batch`] — account-receivable batch filing.
//! - [`billing::validate_payment`] — payment preconditions.

pub mod activity;
pub mod billing;
pub mod client;
pub mod consultant;
pub mod report;

pub use report::ValidationReport;
