//! # Workflow Entities
//!
//! The activity aggregate and its child records: assignments, the
//! bitácora (audit log), approval decisions, and the service order
//! generated on approval.
//!
//! Child records carry **snapshot** copies of people's names and document
//! numbers taken at write time. This duplication is deliberate: an
//! assignment made to "Pedro Consultor" must still read "Pedro Consultor"
//! after the user renames their profile. Do not normalize it away.
//!
//! All entities serialize with `camelCase` field names so persisted
//! documents keep the historical collection shape.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{ActivityId, ClientId, ServiceOrderId, TenantId, UserId};
use crate::status::ActivityStatus;
use crate::temporal::Timestamp;

/// Priority of a requested activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Wire name, as persisted in documents.
    pub fn name(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An evidentiary attachment uploaded at finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportFile {
    /// Sanitized file name.
    pub name: String,
    /// Download URL in the blob store.
    pub url: String,
    /// When the file was uploaded.
    pub date: Timestamp,
}

/// The central entity: one unit of consulting work requested by a client,
/// tracked through its full lifecycle.
///
/// Mutated exclusively through workflow transitions; never deleted.
/// Terminal states (`Paid`, and the stranded `Rejected` of the payment
/// tail) are retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    /// Owning tenant. Every operation on this activity is scoped to it.
    pub tenant_id: TenantId,

    // Basic data
    pub client_id: ClientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_client_id: Option<String>,
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    // Internal tracking
    /// Display identifier (`ORD-XXXXXX`), generated at creation.
    pub order_number: String,
    pub request_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_date: Option<Timestamp>,
    pub priority: Priority,

    // Financials
    /// Billing unit (e.g., "Hora", "Informe", "Visita").
    pub unit: String,
    /// Requested units, positive.
    pub quantity: f64,
    /// Monetary amount, non-negative.
    pub value: f64,

    // Execution info
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,

    // People
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_id: Option<UserId>,
    /// Denormalized pointer to the most recently assigned provider. The
    /// assignment rows are the authoritative record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_provider_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<Timestamp>,

    // Workflow
    pub status: ActivityStatus,
    /// 0–100, derived from status (0 on creation, 50 in execution, 100
    /// finalized).
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supports: Vec<SupportFile>,
    /// Legacy free-text field carried for compatibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    // Approval & service order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<UserId>,
    /// Set if and only if the activity has reached `Approved` or later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_order_id: Option<ServiceOrderId>,

    // Billing & payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_for_billing_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_requested_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<Timestamp>,
}

impl Activity {
    /// Whether at least one support document is attached.
    pub fn has_supports(&self) -> bool {
        !self.supports.is_empty()
    }
}

/// Partial input for creating an activity, mirroring the request form.
/// The creation validator reports every missing or invalid field at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub client_id: Option<ClientId>,
    pub sub_client_id: Option<String>,
    pub activity_type: Option<String>,
    pub description: Option<String>,
    pub required_date: Option<Timestamp>,
    pub priority: Option<Priority>,
    pub unit: Option<String>,
    pub quantity: Option<f64>,
    pub value: Option<f64>,
    pub execution_data: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub coordinator_id: Option<UserId>,
}

/// One provider's share of an activity.
///
/// Immutable once created — corrections require a new assignment and
/// manual reconciliation; there is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAssignment {
    pub id: Uuid,
    pub activity_id: ActivityId,
    pub provider_id: UserId,
    /// Snapshot of the provider's document number at assignment time.
    pub provider_document: String,
    /// Snapshot of the provider's name at assignment time.
    pub provider_name: String,
    /// Share of the work, 1–100. The sum across an activity's assignments
    /// never exceeds 100.
    pub allocation_percentage: u8,
    pub assigned_at: Timestamp,
}

/// One bitácora entry: an immutable record of a status change.
///
/// Write-once, ordered by `date`. Every successful transition appends
/// exactly one entry, the creation itself included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub activity_id: ActivityId,
    pub date: Timestamp,
    /// The status being entered.
    pub status: ActivityStatus,
    pub executed_units: f64,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// One approval or rejection decision on finalized work. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityApproval {
    pub id: Uuid,
    pub activity_id: ActivityId,
    /// Snapshot of the approver's document number at decision time.
    pub approver_document: String,
    /// Snapshot of the approver's name at decision time.
    pub approver_name: String,
    pub approved: bool,
    /// Approval remarks, or the rejection reason.
    pub comments: String,
    pub date: Timestamp,
}

/// Lifecycle of a service order after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceOrderStatus {
    /// Created on approval, not yet claimed.
    Generated,
    /// The provider filed their account receivable against it.
    Filed,
    /// Paid out by accounting.
    Paid,
}

/// The billing-eligible record generated exactly once, on approval.
///
/// At most one service order exists per activity; the workflow guards
/// generation by checking `Activity::service_order_id` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    pub id: ServiceOrderId,
    pub tenant_id: TenantId,
    pub activity_id: ActivityId,
    /// Unique display identifier (`OS-XXXX`).
    pub order_number: String,
    pub status: ServiceOrderStatus,
    /// Initialized to 0; rate lookup against the consultant/client price
    /// tables is an external collaborator.
    pub amount: f64,
    pub generated_at: Timestamp,
    pub approved_by: UserId,
}
