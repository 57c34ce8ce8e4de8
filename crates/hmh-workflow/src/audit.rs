//! The bitácora: an append-only log of everything that happened to an
//! activity.
//!
//! Entries are never edited or deleted. The writer appends after the
//! state change it describes has been persisted, and an append failure
//! is logged and swallowed: losing one bitácora row must not unwind a
//! transition that already happened.

use std::sync::Arc;

use uuid::Uuid;

use hmh_core::{ActivityId, ActivityLog, ActivityStatus, Timestamp, UserId, WorkflowError};
use hmh_store::{add_doc, list_docs, CollectionPath, DocumentStore};

/// Read order for [`AuditLog::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOrder {
    /// Oldest first, the order entries were appended.
    Ascending,
    /// Most recent first, the order the UI shows them.
    Descending,
}

/// One entry to append, before the envelope fields are filled in.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub status: ActivityStatus,
    pub executed_units: f64,
    pub comment: String,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
}

/// Append-only reader/writer over each activity's `logs` subcollection.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn DocumentStore>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append `entry` to the bitácora of `activity_id`. Failure is
    /// logged, never returned: the transition already happened.
    pub async fn record(&self, activity_id: ActivityId, entry: LogEntry) {
        let log = ActivityLog {
            id: Uuid::new_v4(),
            activity_id,
            date: Timestamp::now(),
            status: entry.status,
            executed_units: entry.executed_units,
            comment: entry.comment,
            user_id: entry.user_id,
            user_name: entry.user_name,
        };
        let id = log.id.to_string();
        if let Err(err) = add_doc(
            self.store.as_ref(),
            &CollectionPath::activity_logs(activity_id),
            &id,
            &log,
        )
        .await
        {
            tracing::warn!(activity = %activity_id, error = %err, "bitácora append failed");
        }
    }

    /// Read the bitácora of `activity_id`, sorted by entry date.
    /// Appends within the same second keep their append order.
    pub async fn list(
        &self,
        activity_id: ActivityId,
        order: LogOrder,
    ) -> Result<Vec<ActivityLog>, WorkflowError> {
        let mut logs: Vec<ActivityLog> = list_docs(
            self.store.as_ref(),
            &CollectionPath::activity_logs(activity_id),
        )
        .await?;
        // MemoryStore lists in insertion order; a stable sort on the
        // seconds-precision date preserves it for same-second entries.
        logs.sort_by_key(|l| *l.date.as_datetime());
        if order == LogOrder::Descending {
            logs.reverse();
        }
        Ok(logs)
    }
}
