//! # Activity Status Machine
//!
//! The lifecycle of a consulting activity, from client request through
//! payment. The transition table is data, not code: [`ActivityStatus::allowed_next()`]
//! returns the legal successor states, and every transition request is
//! checked against it before any mutation.
//!
//! ## States
//!
//! ```text
//! PendingAssignment ──▶ Assigned ──▶ InContact ──▶ InExecution ──▶ Finalized
//!        ▲                  │            │              ▲ │            │
//!        └──────────────────┘            └──────────────┘ └────────────┤
//!                         (fallback edges)                             │
//!                                                                      ▼
//!        Paid ◀── AccountReceivableFiled ◀── BillingRequested ◀── Approved
//!                         │                                            ▲
//!                         ▼                                  Rejected ─┘ (approval
//!                      Rejected ──▶ InExecution                  routes through
//!                                                                 InExecution)
//! ```
//!
//! `Paid` is terminal. `Rejected` is reachable from the payment tail and
//! its only outgoing edge returns to `InExecution` — an approval-step
//! rejection never lands here, it routes Finalized → InExecution directly.
//! A payment rejection therefore strands the activity unless someone
//! restarts execution; see the workflow crate's integration tests, which
//! document that gap rather than invent a recovery path.

use serde::{Deserialize, Serialize};

/// The lifecycle status of an activity.
///
/// Serialized as `snake_case` strings (`pending_assignment`, ...) so
/// persisted documents match the historical collection shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Created by an analyst, waiting for a coordinator to assign providers.
    PendingAssignment,
    /// One or more providers assigned with allocation percentages.
    Assigned,
    /// The provider has made first contact with the client.
    InContact,
    /// The provider is executing the work.
    InExecution,
    /// Work finished; executed units and support documents recorded.
    Finalized,
    /// Coordinator approved the finalized work; a service order exists.
    Approved,
    /// Coordinator requested billing from accounting.
    BillingRequested,
    /// The provider filed their account-receivable claim.
    AccountReceivableFiled,
    /// Accounting paid the provider (terminal).
    Paid,
    /// Rejected at the payment step. Only outgoing edge returns to
    /// `InExecution`.
    Rejected,
}

impl ActivityStatus {
    /// The legal successor states of this status.
    ///
    /// This is the canonical transition table. A transition request whose
    /// target is not in this slice fails with
    /// [`WorkflowError::InvalidTransition`](crate::WorkflowError::InvalidTransition)
    /// and leaves the activity unchanged.
    pub fn allowed_next(&self) -> &'static [ActivityStatus] {
        use ActivityStatus::*;
        match self {
            PendingAssignment => &[Assigned],
            Assigned => &[InContact, PendingAssignment],
            InContact => &[InExecution, Assigned],
            InExecution => &[Finalized, InContact],
            Finalized => &[Approved, Rejected, InExecution],
            Approved => &[BillingRequested],
            BillingRequested => &[AccountReceivableFiled],
            AccountReceivableFiled => &[Paid, Rejected],
            Paid => &[],
            Rejected => &[InExecution],
        }
    }

    /// Whether moving from `self` to `to` is an edge of the table.
    pub fn can_transition_to(&self, to: ActivityStatus) -> bool {
        self.allowed_next().contains(&to)
    }

    /// Whether this status has no outgoing edges.
    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// The progress value an activity takes on entering this status, if
    /// the status implies one. Creation starts at 0, execution at 50,
    /// finalization at 100; other statuses leave progress untouched.
    pub fn progress_on_entry(&self) -> Option<u8> {
        match self {
            Self::PendingAssignment => Some(0),
            Self::InExecution => Some(50),
            Self::Finalized => Some(100),
            _ => None,
        }
    }

    /// The canonical wire name of this status (`pending_assignment`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::PendingAssignment => "pending_assignment",
            Self::Assigned => "assigned",
            Self::InContact => "in_contact",
            Self::InExecution => "in_execution",
            Self::Finalized => "finalized",
            Self::Approved => "approved",
            Self::BillingRequested => "billing_requested",
            Self::AccountReceivableFiled => "account_receivable_filed",
            Self::Paid => "paid",
            Self::Rejected => "rejected",
        }
    }

    /// All statuses, in lifecycle order.
    pub const ALL: [ActivityStatus; 10] = [
        Self::PendingAssignment,
        Self::Assigned,
        Self::InContact,
        Self::InExecution,
        Self::Finalized,
        Self::Approved,
        Self::BillingRequested,
        Self::AccountReceivableFiled,
        Self::Paid,
        Self::Rejected,
    ];
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
