//! # Roles and the Role-Permission Matrix
//!
//! A transition requires two independent checks: the status change must be
//! an edge of the transition table, and the acting role must be authorized
//! for the **target** status. The matrix here is the second check,
//! represented as data so adding a role is not a code change across the
//! engine.
//!
//! `admin` shares the coordinator row. `superAdmin` administers tenants
//! and holds no workflow transition rights at all. The `client` role is
//! read-only in the workflow.

use serde::{Deserialize, Serialize};

use crate::status::ActivityStatus;

/// The roles recognized by the platform.
///
/// Serialized as `camelCase` strings (`superAdmin`, ...) matching the
/// historical user documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    /// Platform operator; tenant administration only.
    SuperAdmin,
    /// Tenant administrator; workflow rights of a coordinator.
    Admin,
    /// Assigns providers, approves work, requests billing.
    Coordinator,
    /// Creates activity requests on behalf of clients.
    Analyst,
    /// The consultant executing assigned activities.
    Provider,
    /// A client contact with read-only visibility.
    Client,
    /// Processes payments of filed accounts receivable.
    Accountant,
}

impl UserRole {
    /// The target statuses this role may transition an activity to.
    ///
    /// Creation is not covered here — `create_activity` checks the acting
    /// role directly, since creating an activity is not a transition.
    pub fn allowed_targets(&self) -> &'static [ActivityStatus] {
        use ActivityStatus::*;
        match self {
            Self::Coordinator | Self::Admin => &[Assigned, Approved, Rejected, BillingRequested],
            Self::Provider => &[InContact, InExecution, Finalized, AccountReceivableFiled],
            Self::Accountant => &[Paid, Rejected],
            Self::Analyst => &[PendingAssignment],
            Self::SuperAdmin | Self::Client => &[],
        }
    }

    /// Whether this role may transition an activity to `target`.
    pub fn may_set_status(&self, target: ActivityStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Whether this role may create activity requests.
    pub fn may_create_activities(&self) -> bool {
        matches!(self, Self::Analyst | Self::Coordinator | Self::Admin)
    }

    /// Whether this role may approve or reject finalized work.
    pub fn may_approve(&self) -> bool {
        matches!(self, Self::Coordinator | Self::Admin)
    }

    /// Whether this role may process payments.
    pub fn may_process_payments(&self) -> bool {
        matches!(self, Self::Accountant | Self::Admin)
    }

    /// The canonical wire name of this role (`superAdmin`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "superAdmin",
            Self::Admin => "admin",
            Self::Coordinator => "coordinator",
            Self::Analyst => "analyst",
            Self::Provider => "provider",
            Self::Client => "client",
            Self::Accountant => "accountant",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
