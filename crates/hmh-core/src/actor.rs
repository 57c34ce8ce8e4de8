//! # Actors — Users and Clients
//!
//! Read-models for the people and organizations the workflow touches.
//! Users are owned by the excluded authentication layer; the workflow
//! reads them as context for permission checks and snapshots. Clients are
//! owned by the excluded client-management layer; only their validation
//! rules live in this workspace.

use serde::{Deserialize, Serialize};

use crate::identity::{ClientId, TenantId, UserId};
use crate::role::UserRole;

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Blocked,
}

/// A platform user. The workflow treats this as read-only context: role
/// and tenant for permission checks, name and document number for the
/// snapshot fields on child records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Absent only for the platform operator (`superAdmin`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    pub email: String,
    pub role: UserRole,
    pub name: String,
    pub status: UserStatus,

    // Provider/consultant profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

impl User {
    /// Whether the account may act at all.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// The document number snapshot written onto child records. Falls
    /// back to `"N/A"` when the profile carries none, so historical rows
    /// are never half-empty.
    pub fn document_snapshot(&self) -> String {
        self.document_number
            .clone()
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// A client of a tenant: the organization requesting consulting work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub tenant_id: TenantId,
    /// NIT (tax identifier).
    pub tax_id: String,
    /// Razón social.
    pub name: String,
    pub phone: String,
    pub address: String,
    pub department: String,
    pub city: String,
    /// The coordinator responsible for this client.
    pub hmh_coordinator_id: UserId,
    /// Free-text billing conditions.
    pub billing_terms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

/// Partial input for registering a client, consumed by the client-data
/// validator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDraft {
    pub tax_id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub city: Option<String>,
    pub hmh_coordinator_id: Option<UserId>,
    pub billing_terms: Option<String>,
}
