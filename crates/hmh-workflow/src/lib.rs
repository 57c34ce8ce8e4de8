//! # hmh-workflow
//!
//! The activity workflow engine: every lifecycle mutation of an
//! activity goes through [`ActivityWorkflow`], which composes the pure
//! rules from `hmh-validate`, the document and blob stores from
//! `hmh-store`, and the dispatcher from `hmh-notify`.
//!
//! ## Write discipline
//!
//! Each operation serializes on the activity's lock, validates against
//! the freshly loaded document, then writes. The bitácora entry and the
//! notification come after the write and are best-effort: they are
//! logged on failure and never unwind a transition that already
//! happened.

pub mod allocator;
pub mod audit;
pub mod engine;
pub mod lock;
pub mod order;

pub use allocator::AssignmentAllocator;
pub use audit::{AuditLog, LogEntry, LogOrder};
pub use engine::{ActivityWorkflow, ProgressUpdate};
pub use lock::ActivityLocks;
