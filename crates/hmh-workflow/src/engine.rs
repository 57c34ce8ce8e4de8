//! The workflow engine.
//!
//! [`ActivityWorkflow`] owns every mutation of an activity. Each
//! operation follows the same shape: acquire the activity's lock, load
//! the current document, run the pure validation rules, persist the
//! patch, append the bitácora entry, and hand the notification event to
//! the dispatcher. Validation failures happen before any write; bitácora
//! and notification failures happen after the write and never unwind it.
//!
//! The acting [`User`] is a parameter of every operation. Nothing here
//! reads an ambient current-user or current-tenant.

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use hmh_core::{
    Activity, ActivityApproval, ActivityAssignment, ActivityDraft, ActivityId, ActivityLog,
    ActivityStatus, Client, Priority, ServiceOrder, ServiceOrderStatus, SupportFile, Timestamp,
    User, UserRole, WorkflowError,
};
use hmh_notify::{Dispatcher, NotificationEvent};
use hmh_store::{
    add_doc, get_doc, query_docs, BlobStore, CollectionPath, DocumentStore, FileUpload,
};
use hmh_validate::activity::{
    validate_activity_approval, validate_activity_creation, validate_activity_finalization,
    validate_status_change,
};
use hmh_validate::billing::{validate_billing_request, validate_payment, validate_receivable_batch};

use crate::allocator::AssignmentAllocator;
use crate::audit::{AuditLog, LogEntry, LogOrder};
use crate::lock::ActivityLocks;
use crate::order::{activity_order_number, generate_service_order};

/// A provider's progress report accompanying a status change.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub executed_units: f64,
    pub comment: String,
}

/// The engine. Cheap to clone; all state lives behind `Arc`s.
#[derive(Clone)]
pub struct ActivityWorkflow {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    audit: AuditLog,
    allocator: AssignmentAllocator,
    locks: Arc<ActivityLocks>,
    dispatcher: Dispatcher,
}

impl ActivityWorkflow {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            audit: AuditLog::new(store.clone()),
            allocator: AssignmentAllocator::new(store.clone()),
            locks: Arc::new(ActivityLocks::new()),
            store,
            blobs,
            dispatcher,
        }
    }

    /// Create a new activity request in `pending_assignment`.
    pub async fn create_activity(
        &self,
        draft: ActivityDraft,
        acting: &User,
    ) -> Result<Activity, WorkflowError> {
        let tenant_id = acting
            .tenant_id
            .ok_or_else(|| WorkflowError::validation("Se requiere contexto de tenant"))?;
        if !acting.role.may_create_activities() {
            return Err(WorkflowError::validation(
                "Solo analistas, coordinadores y administradores pueden crear solicitudes",
            ));
        }

        let now = Timestamp::now();
        validate_activity_creation(&draft, now.date_utc()).into_result()?;

        // The validator guarantees these, but the engine does not unwrap.
        let client_id = draft
            .client_id
            .ok_or_else(|| WorkflowError::validation("Debe seleccionar un cliente"))?;
        let activity_type = draft
            .activity_type
            .ok_or_else(|| WorkflowError::validation("Debe seleccionar un tipo de actividad"))?;

        let activity = Activity {
            id: ActivityId::new(),
            tenant_id,
            client_id,
            sub_client_id: draft.sub_client_id,
            activity_type,
            description: draft.description,
            order_number: activity_order_number(),
            request_date: now,
            required_date: draft.required_date,
            priority: draft.priority.unwrap_or(Priority::Medium),
            unit: draft.unit.unwrap_or_default(),
            quantity: draft.quantity.unwrap_or_default(),
            value: draft.value.unwrap_or_default(),
            execution_data: draft.execution_data,
            contact_name: draft.contact_name,
            contact_phone: draft.contact_phone,
            coordinator_id: draft.coordinator_id,
            assigned_provider_id: None,
            assigned_at: None,
            status: ActivityStatus::PendingAssignment,
            progress: 0,
            supports: Vec::new(),
            comments: None,
            approval_date: None,
            approved_by: None,
            service_order_id: None,
            ready_for_billing_by: None,
            billing_requested_at: None,
            paid_at: None,
        };

        let id = activity.id.as_uuid().to_string();
        add_doc(self.store.as_ref(), &CollectionPath::activities(), &id, &activity).await?;

        self.audit
            .record(
                activity.id,
                LogEntry {
                    status: ActivityStatus::PendingAssignment,
                    executed_units: 0.0,
                    comment: "Solicitud creada en el sistema".to_string(),
                    user_id: Some(acting.id),
                    user_name: Some(acting.name.clone()),
                },
            )
            .await;

        Ok(activity)
    }

    /// Allocate a share of the activity to `provider` and move it to
    /// `assigned`. The parent's `assignedProviderId` always points at the
    /// most recently assigned consultant.
    pub async fn assign_provider(
        &self,
        activity_id: ActivityId,
        provider: &User,
        percentage: u8,
        acting: &User,
    ) -> Result<Activity, WorkflowError> {
        let _guard = self.locks.acquire(activity_id).await;
        let mut activity = self.load_activity(activity_id).await?;

        if !acting.role.may_set_status(ActivityStatus::Assigned) {
            return Err(WorkflowError::PermissionDenied {
                role: acting.role,
                target: ActivityStatus::Assigned,
            });
        }

        let assignment = self.allocator.assign(&activity, provider, percentage).await?;

        let now = Timestamp::now();
        activity.assigned_provider_id = Some(provider.id);
        activity.status = ActivityStatus::Assigned;
        activity.assigned_at = Some(now);
        self.patch_activity(
            activity_id,
            json!({
                "assignedProviderId": provider.id,
                "status": ActivityStatus::Assigned,
                "assignedAt": now,
            }),
        )
        .await?;

        self.audit
            .record(
                activity_id,
                LogEntry {
                    status: ActivityStatus::Assigned,
                    executed_units: 0.0,
                    comment: format!(
                        "Asignada a {} ({}%)",
                        assignment.provider_name, assignment.allocation_percentage
                    ),
                    user_id: Some(acting.id),
                    user_name: Some(acting.name.clone()),
                },
            )
            .await;

        let client_name = self.client_name(&activity).await;
        self.dispatcher.notify(NotificationEvent::Assigned {
            activity: activity.clone(),
            provider: provider.clone(),
            client_name,
        });

        Ok(activity)
    }

    /// A consultant reports progress: `in_contact` or `in_execution`.
    /// Progress jumps to the stage's fixed value on entry.
    ///
    /// Entering `finalized` through this path carries the full
    /// finalization preconditions against the supports already on the
    /// activity; fresh uploads go through [`Self::finalize_activity`].
    pub async fn transition_status(
        &self,
        activity_id: ActivityId,
        new_status: ActivityStatus,
        update: ProgressUpdate,
        acting: &User,
    ) -> Result<Activity, WorkflowError> {
        let _guard = self.locks.acquire(activity_id).await;
        let mut activity = self.load_activity(activity_id).await?;

        validate_status_change(activity.status, new_status, acting.role)?;

        if update.executed_units < 0.0 {
            return Err(WorkflowError::validation(
                "Las unidades ejecutadas no pueden ser negativas",
            ));
        }

        if new_status == ActivityStatus::Finalized {
            validate_activity_finalization(&activity, update.executed_units, &activity.supports)
                .into_result()?;
        }

        let mut patch = json!({ "status": new_status });
        if let Some(progress) = new_status.progress_on_entry() {
            activity.progress = progress;
            patch["progress"] = json!(progress);
        }
        activity.status = new_status;
        self.patch_activity(activity_id, patch).await?;

        self.audit
            .record(
                activity_id,
                LogEntry {
                    status: new_status,
                    executed_units: update.executed_units,
                    comment: update.comment,
                    user_id: Some(acting.id),
                    user_name: Some(acting.name.clone()),
                },
            )
            .await;

        Ok(activity)
    }

    /// Finalize the work: upload the support documents, verify the
    /// executed units, and move to `finalized` at 100% progress.
    pub async fn finalize_activity(
        &self,
        activity_id: ActivityId,
        update: ProgressUpdate,
        files: Vec<FileUpload>,
        acting: &User,
    ) -> Result<Activity, WorkflowError> {
        let _guard = self.locks.acquire(activity_id).await;
        let mut activity = self.load_activity(activity_id).await?;

        validate_status_change(activity.status, ActivityStatus::Finalized, acting.role)?;

        let path = hmh_store::blob::activity_supports_path(&activity.tenant_id, &activity_id);
        let mut supports = Vec::with_capacity(files.len());
        for file in &files {
            let uploaded = self.blobs.upload(file, &path).await?;
            supports.push(SupportFile {
                name: uploaded.name,
                url: uploaded.url,
                date: Timestamp::now(),
            });
        }

        if let Err(err) =
            validate_activity_finalization(&activity, update.executed_units, &supports)
                .into_result()
        {
            // Roll the uploads back; the state change never happened.
            for support in &supports {
                if let Err(delete_err) = self.blobs.delete(&support.url).await {
                    tracing::warn!(url = %support.url, error = %delete_err, "orphan support cleanup failed");
                }
            }
            return Err(err);
        }

        activity.status = ActivityStatus::Finalized;
        activity.progress = 100;
        activity.supports = supports.clone();
        self.patch_activity(
            activity_id,
            json!({
                "status": ActivityStatus::Finalized,
                "progress": 100,
                "supports": supports,
            }),
        )
        .await?;

        self.audit
            .record(
                activity_id,
                LogEntry {
                    status: ActivityStatus::Finalized,
                    executed_units: update.executed_units,
                    comment: update.comment,
                    user_id: Some(acting.id),
                    user_name: Some(acting.name.clone()),
                },
            )
            .await;

        Ok(activity)
    }

    /// Decide on finalized work. Approval generates the service order
    /// and moves to `approved`; rejection records the decision and sends
    /// the activity back to `in_execution` for rework.
    pub async fn submit_approval(
        &self,
        activity_id: ActivityId,
        approved: bool,
        comments: &str,
        acting: &User,
    ) -> Result<Activity, WorkflowError> {
        let _guard = self.locks.acquire(activity_id).await;
        let mut activity = self.load_activity(activity_id).await?;

        validate_activity_approval(&activity, acting.role).into_result()?;

        let approval = ActivityApproval {
            id: Uuid::new_v4(),
            activity_id,
            approver_document: acting.document_snapshot(),
            approver_name: acting.name.clone(),
            approved,
            comments: comments.to_string(),
            date: Timestamp::now(),
        };
        let approval_id = approval.id.to_string();
        add_doc(
            self.store.as_ref(),
            &CollectionPath::activity_approvals(activity_id),
            &approval_id,
            &approval,
        )
        .await?;

        if approved {
            // At most one service order per activity: a re-approval after
            // a rejection cycle reuses the one already generated.
            let order = match activity.service_order_id {
                Some(existing) => self.load_service_order(existing).await?,
                None => {
                    let order = generate_service_order(&activity, acting);
                    let order_id = order.id.as_uuid().to_string();
                    add_doc(
                        self.store.as_ref(),
                        &CollectionPath::service_orders(),
                        &order_id,
                        &order,
                    )
                    .await?;
                    order
                }
            };

            let now = Timestamp::now();
            activity.status = ActivityStatus::Approved;
            activity.service_order_id = Some(order.id);
            activity.approval_date = Some(now);
            activity.approved_by = Some(acting.id);
            self.patch_activity(
                activity_id,
                json!({
                    "status": ActivityStatus::Approved,
                    "serviceOrderId": order.id,
                    "approvalDate": now,
                    "approvedBy": acting.id,
                }),
            )
            .await?;

            self.audit
                .record(
                    activity_id,
                    LogEntry {
                        status: ActivityStatus::Approved,
                        executed_units: activity.quantity,
                        comment: format!(
                            "Aprobada. Orden Servicio Generada: {}. Comentarios: {comments}",
                            order.order_number
                        ),
                        user_id: Some(acting.id),
                        user_name: Some(acting.name.clone()),
                    },
                )
                .await;

            if let Some(provider) = self.provider_of(&activity).await {
                self.dispatcher.notify(NotificationEvent::Approved {
                    activity: activity.clone(),
                    provider,
                    service_order_number: order.order_number.clone(),
                    comments: if comments.is_empty() {
                        None
                    } else {
                        Some(comments.to_string())
                    },
                });
            }
        } else {
            activity.status = ActivityStatus::InExecution;
            self.patch_activity(
                activity_id,
                json!({ "status": ActivityStatus::InExecution }),
            )
            .await?;

            self.audit
                .record(
                    activity_id,
                    LogEntry {
                        status: ActivityStatus::InExecution,
                        executed_units: 0.0,
                        comment: format!("Rechazada/Requiere Ajuste. Comentarios: {comments}"),
                        user_id: Some(acting.id),
                        user_name: Some(acting.name.clone()),
                    },
                )
                .await;

            if let Some(provider) = self.provider_of(&activity).await {
                self.dispatcher.notify(NotificationEvent::Rejected {
                    activity: activity.clone(),
                    provider,
                    comments: comments.to_string(),
                });
            }
        }

        Ok(activity)
    }

    /// Send an approved activity to accounting for invoicing.
    pub async fn request_billing(
        &self,
        activity_id: ActivityId,
        acting: &User,
    ) -> Result<Activity, WorkflowError> {
        let _guard = self.locks.acquire(activity_id).await;
        let mut activity = self.load_activity(activity_id).await?;

        validate_billing_request(&activity).into_result()?;
        validate_status_change(activity.status, ActivityStatus::BillingRequested, acting.role)?;

        let now = Timestamp::now();
        activity.status = ActivityStatus::BillingRequested;
        activity.ready_for_billing_by = Some(acting.id);
        activity.billing_requested_at = Some(now);
        self.patch_activity(
            activity_id,
            json!({
                "status": ActivityStatus::BillingRequested,
                "readyForBillingBy": acting.id,
                "billingRequestedAt": now,
            }),
        )
        .await?;

        self.audit
            .record(
                activity_id,
                LogEntry {
                    status: ActivityStatus::BillingRequested,
                    executed_units: 0.0,
                    comment: "Solicitud de facturación enviada a contabilidad.".to_string(),
                    user_id: Some(acting.id),
                    user_name: None,
                },
            )
            .await;

        let accountants = self.tenant_accountants(&activity).await;
        if !accountants.is_empty() {
            let client_name = self.client_name(&activity).await;
            let service_order_number = match activity.service_order_id {
                Some(id) => self
                    .load_service_order(id)
                    .await
                    .map(|o| o.order_number)
                    .unwrap_or_else(|_| "N/A".to_string()),
                None => "N/A".to_string(),
            };
            for accountant in accountants {
                self.dispatcher.notify(NotificationEvent::BillingRequested {
                    activity: activity.clone(),
                    accountant,
                    client_name: client_name.clone(),
                    service_order_number: service_order_number.clone(),
                });
            }
        }

        Ok(activity)
    }

    /// A consultant files one account receivable covering a batch of
    /// their activities. Every activity must be in `billing_requested`;
    /// each moves to `account_receivable_filed` and its service order
    /// advances to `filed`.
    pub async fn file_receivables(
        &self,
        activity_ids: &[ActivityId],
        acting: &User,
    ) -> Result<Vec<Activity>, WorkflowError> {
        let mut preread = Vec::with_capacity(activity_ids.len());
        for id in activity_ids {
            preread.push(self.load_activity(*id).await?);
        }
        validate_receivable_batch(&preread, acting.id).into_result()?;
        drop(preread);

        // Locks are taken one activity at a time, never nested, so two
        // overlapping batches cannot deadlock. The re-read and the
        // transition check under the lock stop a racing batch from
        // filing the same activity twice.
        let mut activities = Vec::with_capacity(activity_ids.len());
        for id in activity_ids {
            let _guard = self.locks.acquire(*id).await;
            let mut activity = self.load_activity(*id).await?;

            validate_status_change(
                activity.status,
                ActivityStatus::AccountReceivableFiled,
                acting.role,
            )?;

            activity.status = ActivityStatus::AccountReceivableFiled;
            self.patch_activity(
                activity.id,
                json!({ "status": ActivityStatus::AccountReceivableFiled }),
            )
            .await?;

            if let Some(order_id) = activity.service_order_id {
                self.patch_service_order(order_id, ServiceOrderStatus::Filed).await;
            }

            self.audit
                .record(
                    activity.id,
                    LogEntry {
                        status: ActivityStatus::AccountReceivableFiled,
                        executed_units: 0.0,
                        comment: "Cuenta de cobro radicada por el consultor.".to_string(),
                        user_id: Some(acting.id),
                        user_name: Some(acting.name.clone()),
                    },
                )
                .await;

            activities.push(activity);
        }

        Ok(activities)
    }

    /// Accounting settles a filed account receivable. Payment moves the
    /// activity to the terminal `paid`; a rejection moves it to
    /// `rejected` and clears any `paidAt`.
    pub async fn process_payment(
        &self,
        activity_id: ActivityId,
        paid: bool,
        acting: &User,
    ) -> Result<Activity, WorkflowError> {
        let _guard = self.locks.acquire(activity_id).await;
        let mut activity = self.load_activity(activity_id).await?;

        validate_payment(&activity, acting.role).into_result()?;

        let new_status = if paid {
            ActivityStatus::Paid
        } else {
            ActivityStatus::Rejected
        };
        let now = Timestamp::now();
        activity.status = new_status;
        activity.paid_at = if paid { Some(now) } else { None };
        self.patch_activity(
            activity_id,
            json!({
                "status": new_status,
                "paidAt": if paid { json!(now) } else { Value::Null },
            }),
        )
        .await?;

        if paid {
            if let Some(order_id) = activity.service_order_id {
                self.patch_service_order(order_id, ServiceOrderStatus::Paid).await;
            }
        }

        self.audit
            .record(
                activity_id,
                LogEntry {
                    status: new_status,
                    executed_units: 0.0,
                    comment: if paid {
                        "Pago realizado exitosamente.".to_string()
                    } else {
                        "Pago rechazado por contabilidad.".to_string()
                    },
                    user_id: Some(acting.id),
                    user_name: Some(acting.name.clone()),
                },
            )
            .await;

        if paid {
            if let Some(provider) = self.provider_of(&activity).await {
                self.dispatcher.notify(NotificationEvent::PaymentProcessed {
                    activity: activity.clone(),
                    provider,
                    comments: None,
                });
            }
        }

        Ok(activity)
    }

    /// Fetch one activity.
    pub async fn get_activity(&self, activity_id: ActivityId) -> Result<Activity, WorkflowError> {
        self.load_activity(activity_id).await
    }

    /// List the activities visible to `acting`: everything for the
    /// super admin, only their own assignments for a provider, the whole
    /// tenant for everyone else.
    pub async fn list_activities(&self, acting: &User) -> Result<Vec<Activity>, WorkflowError> {
        if acting.role == UserRole::SuperAdmin {
            return Ok(
                hmh_store::list_docs(self.store.as_ref(), &CollectionPath::activities()).await?,
            );
        }
        let Some(tenant_id) = acting.tenant_id else {
            return Ok(Vec::new());
        };
        if acting.role == UserRole::Provider {
            let mine: Vec<Activity> = query_docs(
                self.store.as_ref(),
                &CollectionPath::activities(),
                "assignedProviderId",
                &json!(acting.id),
            )
            .await?;
            return Ok(mine.into_iter().filter(|a| a.tenant_id == tenant_id).collect());
        }
        Ok(query_docs(
            self.store.as_ref(),
            &CollectionPath::activities(),
            "tenantId",
            &json!(tenant_id),
        )
        .await?)
    }

    /// Read the bitácora of one activity.
    pub async fn list_audit_log(
        &self,
        activity_id: ActivityId,
        order: LogOrder,
    ) -> Result<Vec<ActivityLog>, WorkflowError> {
        self.audit.list(activity_id, order).await
    }

    /// Read the assignment rows of one activity.
    pub async fn list_assignments(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ActivityAssignment>, WorkflowError> {
        self.allocator.list(activity_id).await
    }

    /// Fetch the service order of one activity, if generated.
    pub async fn get_service_order(
        &self,
        activity_id: ActivityId,
    ) -> Result<Option<ServiceOrder>, WorkflowError> {
        let activity = self.load_activity(activity_id).await?;
        match activity.service_order_id {
            Some(id) => Ok(Some(self.load_service_order(id).await?)),
            None => Ok(None),
        }
    }

    async fn load_activity(&self, id: ActivityId) -> Result<Activity, WorkflowError> {
        get_doc(self.store.as_ref(), &CollectionPath::activities(), &id.as_uuid().to_string())
            .await?
            .ok_or_else(|| WorkflowError::NotFound {
                kind: "activity",
                id: id.to_string(),
            })
    }

    async fn load_service_order(
        &self,
        id: hmh_core::ServiceOrderId,
    ) -> Result<ServiceOrder, WorkflowError> {
        get_doc(self.store.as_ref(), &CollectionPath::service_orders(), &id.as_uuid().to_string())
            .await?
            .ok_or_else(|| WorkflowError::NotFound {
                kind: "service order",
                id: id.to_string(),
            })
    }

    async fn patch_activity(&self, id: ActivityId, patch: Value) -> Result<(), WorkflowError> {
        Ok(self
            .store
            .update(&CollectionPath::activities(), &id.as_uuid().to_string(), patch)
            .await?)
    }

    /// Advance a service order's status. Best-effort supplement to the
    /// activity transition; a failure is logged, not propagated.
    async fn patch_service_order(
        &self,
        id: hmh_core::ServiceOrderId,
        status: ServiceOrderStatus,
    ) {
        if let Err(err) = self
            .store
            .update(
                &CollectionPath::service_orders(),
                &id.as_uuid().to_string(),
                json!({ "status": status }),
            )
            .await
        {
            tracing::warn!(order = %id, error = %err, "service order status update failed");
        }
    }

    /// Client display name for notifications, `"N/A"` when unknown.
    async fn client_name(&self, activity: &Activity) -> String {
        get_doc::<Client>(
            self.store.as_ref(),
            &CollectionPath::tenant_clients(activity.tenant_id),
            &activity.client_id.as_uuid().to_string(),
        )
        .await
        .ok()
        .flatten()
        .map(|c| c.name)
        .unwrap_or_else(|| "N/A".to_string())
    }

    /// The assigned consultant's user record, if resolvable.
    async fn provider_of(&self, activity: &Activity) -> Option<User> {
        let provider_id = activity.assigned_provider_id?;
        get_doc::<User>(
            self.store.as_ref(),
            &CollectionPath::users(),
            &provider_id.as_uuid().to_string(),
        )
        .await
        .ok()
        .flatten()
    }

    /// The active accountants of the activity's tenant.
    async fn tenant_accountants(&self, activity: &Activity) -> Vec<User> {
        let accountants: Vec<User> = query_docs(
            self.store.as_ref(),
            &CollectionPath::users(),
            "role",
            &json!(UserRole::Accountant),
        )
        .await
        .unwrap_or_default();
        accountants
            .into_iter()
            .filter(|u| u.tenant_id == Some(activity.tenant_id) && u.is_active())
            .collect()
    }
}
