//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the workflow stack.
//! These prevent accidental identifier confusion — you cannot pass a
//! `UserId` where an `ActivityId` is expected, and an activity belonging
//! to one tenant cannot be silently addressed by another tenant's id.
//!
//! Identifiers serialize as plain UUID strings so persisted documents
//! stay readable and queryable by field equality.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tenant (one customer organization of the platform).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub Uuid);

/// Unique identifier for an activity (one unit of requested consulting work).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub Uuid);

/// Unique identifier for a user in any role (analyst, coordinator,
/// provider, accountant, admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

/// Unique identifier for a client of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub Uuid);

/// Unique identifier for a service order generated on activity approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceOrderId(pub Uuid);

macro_rules! impl_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

impl_id!(TenantId, "tenant");
impl_id!(ActivityId, "activity");
impl_id!(UserId, "user");
impl_id!(ClientId, "client");
impl_id!(ServiceOrderId, "order");
