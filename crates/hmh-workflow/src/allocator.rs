//! Assignment allocation.
//!
//! Each activity carries a subcollection of assignment rows, one per
//! consultant, whose `allocationPercentage` values sum to at most 100.
//! The allocator reads the existing rows, runs the assignment rules,
//! and appends the new row with snapshot copies of the consultant's
//! name and document number.
//!
//! Callers must hold the activity's lock across the call; the read and
//! the append are not otherwise atomic.

use std::sync::Arc;

use uuid::Uuid;

use hmh_core::{Activity, ActivityAssignment, ActivityId, Timestamp, User, WorkflowError};
use hmh_store::{add_doc, list_docs, CollectionPath, DocumentStore};
use hmh_validate::activity::validate_activity_assignment;

/// Reader/writer over each activity's `assignments` subcollection.
#[derive(Clone)]
pub struct AssignmentAllocator {
    store: Arc<dyn DocumentStore>,
}

impl AssignmentAllocator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List the assignment rows of `activity_id` in append order.
    pub async fn list(&self, activity_id: ActivityId) -> Result<Vec<ActivityAssignment>, WorkflowError> {
        Ok(list_docs(
            self.store.as_ref(),
            &CollectionPath::activity_assignments(activity_id),
        )
        .await?)
    }

    /// Allocate `percentage` of `activity` to `provider` and persist the
    /// row. Rejects any allocation that would push the total past 100%.
    ///
    /// Caller holds the activity lock.
    pub async fn assign(
        &self,
        activity: &Activity,
        provider: &User,
        percentage: u8,
    ) -> Result<ActivityAssignment, WorkflowError> {
        let existing = self.list(activity.id).await?;
        validate_activity_assignment(activity, provider, percentage, &existing).into_result()?;

        let assignment = ActivityAssignment {
            id: Uuid::new_v4(),
            activity_id: activity.id,
            provider_id: provider.id,
            provider_document: provider.document_snapshot(),
            provider_name: provider.name.clone(),
            allocation_percentage: percentage,
            assigned_at: Timestamp::now(),
        };
        let id = assignment.id.to_string();
        add_doc(
            self.store.as_ref(),
            &CollectionPath::activity_assignments(activity.id),
            &id,
            &assignment,
        )
        .await?;
        Ok(assignment)
    }
}
