//! # hmh-core — Foundational Types for the HMH Workflow Stack
//!
//! This crate is the bedrock of the HMH Workflow Stack. It defines the
//! type-system primitives every other crate builds on: domain identifiers,
//! UTC timestamps, the activity status machine, the role-permission matrix,
//! the workflow entities, and the error taxonomy. Every other crate in the
//! workspace depends on `hmh-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `TenantId`, `ActivityId`,
//!    `UserId`, `ClientId`, `ServiceOrderId` — all newtypes with generated
//!    constructors. No bare strings for identifiers.
//!
//! 2. **Enum-keyed lookup tables, not conditional chains.** The status
//!    transition table and the role-permission matrix are data
//!    ([`ActivityStatus::allowed_next()`], [`UserRole::may_set_status()`]).
//!    Adding a status or a role is a data change, not a code change.
//!
//! 3. **Explicit acting context.** Nothing in this workspace reads an
//!    ambient current-user or current-tenant; the acting [`User`] is a
//!    parameter of every workflow operation.
//!
//! 4. **Snapshot-not-reference child records.** `providerName`,
//!    `providerDocument`, `approverName` are stored redundantly on
//!    assignment and approval rows so a later profile edit cannot rewrite
//!    audit history.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `hmh-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod activity;
pub mod actor;
pub mod error;
pub mod identity;
pub mod role;
pub mod status;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use activity::{
    Activity, ActivityApproval, ActivityAssignment, ActivityDraft, ActivityLog, Priority,
    ServiceOrder, ServiceOrderStatus, SupportFile,
};
pub use actor::{Client, ClientDraft, User, UserStatus};
pub use error::WorkflowError;
pub use identity::{ActivityId, ClientId, ServiceOrderId, TenantId, UserId};
pub use role::UserRole;
pub use status::ActivityStatus;
pub use temporal::Timestamp;
