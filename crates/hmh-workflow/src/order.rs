//! Display order numbers and service-order generation.
//!
//! Two number families coexist: `ORD-` prefixed request numbers stamped
//! on every activity at creation, and `OS-` prefixed service-order
//! numbers minted on approval. Both are display identifiers shown to
//! people; document identity is always the UUID.

use chrono::Utc;
use rand::Rng;

use hmh_core::{Activity, ServiceOrder, ServiceOrderId, ServiceOrderStatus, Timestamp, User};

/// Mint an activity request number: `ORD-` plus the last six digits of
/// the current epoch milliseconds.
pub fn activity_order_number() -> String {
    format!("ORD-{:06}", Utc::now().timestamp_millis().rem_euclid(1_000_000))
}

/// Mint a service-order display number: `OS-` plus a random number
/// below 10000.
pub fn service_order_number() -> String {
    format!("OS-{}", rand::thread_rng().gen_range(0..10_000))
}

/// Build the service order generated when `approver` approves
/// `activity`. Starts in `generated`; the billing tail advances it to
/// `filed` and `paid`. The amount starts at zero and is settled later
/// by accounting.
pub fn generate_service_order(activity: &Activity, approver: &User) -> ServiceOrder {
    ServiceOrder {
        id: ServiceOrderId::new(),
        tenant_id: activity.tenant_id,
        activity_id: activity.id,
        order_number: service_order_number(),
        status: ServiceOrderStatus::Generated,
        amount: 0.0,
        generated_at: Timestamp::now(),
        approved_by: approver.id,
    }
}
