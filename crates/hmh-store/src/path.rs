//! # Collection Paths
//!
//! Hierarchical document addresses. The historical store encoded
//! parent/child relationships as nested path strings
//! (`activities/{a}/logs`, `tenants/{t}/clients`); this module keeps the
//! addressing scheme but makes every path a typed constructor, so no call
//! site assembles a path with `format!` and a typo cannot invent a
//! collection.

use hmh_core::{ActivityId, ClientId, TenantId, UserId};

/// The address of one document collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// The path as a string key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Root collection of all activities.
    pub fn activities() -> Self {
        Self("activities".to_string())
    }

    /// Bitácora of one activity.
    pub fn activity_logs(activity: ActivityId) -> Self {
        Self(format!("activities/{}/logs", activity.as_uuid()))
    }

    /// Assignment rows of one activity.
    pub fn activity_assignments(activity: ActivityId) -> Self {
        Self(format!("activities/{}/assignments", activity.as_uuid()))
    }

    /// Approval decisions of one activity.
    pub fn activity_approvals(activity: ActivityId) -> Self {
        Self(format!("activities/{}/approvals", activity.as_uuid()))
    }

    /// Root collection of service orders.
    pub fn service_orders() -> Self {
        Self("serviceOrders".to_string())
    }

    /// Root collection of users.
    pub fn users() -> Self {
        Self("users".to_string())
    }

    /// In-app notification feed of one user.
    pub fn user_notifications(user: UserId) -> Self {
        Self(format!("users/{}/notifications", user.as_uuid()))
    }

    /// Clients of one tenant.
    pub fn tenant_clients(tenant: TenantId) -> Self {
        Self(format!("tenants/{}/clients", tenant.as_uuid()))
    }

    /// Sub-clients of one client.
    pub fn client_subclients(tenant: TenantId, client: ClientId) -> Self {
        Self(format!(
            "tenants/{}/clients/{}/subclients",
            tenant.as_uuid(),
            client.as_uuid()
        ))
    }

    /// Consultant rate table of one tenant.
    pub fn tenant_consultant_rates(tenant: TenantId) -> Self {
        Self(format!("tenants/{}/consultantRates", tenant.as_uuid()))
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
