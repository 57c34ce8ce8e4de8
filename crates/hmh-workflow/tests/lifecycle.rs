//! End-to-end workflow scenarios against the in-memory stores: the full
//! happy path from creation to payment, the rejection loops, and the
//! allocation and permission guards.

use std::sync::Arc;

use hmh_core::{
    ActivityDraft, ActivityStatus, ClientId, Priority, ServiceOrderStatus, TenantId, User, UserId,
    UserRole, UserStatus,
};
use hmh_notify::{Dispatcher, LogMailSender};
use hmh_store::{add_doc, CollectionPath, DocumentStore, FileUpload, MemoryBlobStore, MemoryStore};
use hmh_workflow::{ActivityWorkflow, LogOrder, ProgressUpdate};

struct Harness {
    engine: ActivityWorkflow,
    store: Arc<MemoryStore>,
    tenant: TenantId,
    analyst: User,
    coordinator: User,
    provider: User,
    accountant: User,
}

fn user(tenant: TenantId, role: UserRole, name: &str) -> User {
    User {
        id: UserId::new(),
        tenant_id: Some(tenant),
        email: format!("{}@hmh.example", name.to_lowercase().replace(' ', ".")),
        role,
        name: name.to_string(),
        status: UserStatus::Active,
        document_type: Some("CC".to_string()),
        document_number: Some("1018456789".to_string()),
        profession: None,
        phone: None,
        department: None,
        city: None,
        hourly_rate: None,
    }
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let dispatcher = Dispatcher::new(
        Arc::new(LogMailSender),
        store.clone(),
        "https://hmh.example",
    );
    let engine = ActivityWorkflow::new(store.clone(), blobs, dispatcher);

    let tenant = TenantId::new();
    let analyst = user(tenant, UserRole::Analyst, "Ana Analista");
    let coordinator = user(tenant, UserRole::Coordinator, "Carlos Coordinador");
    let provider = user(tenant, UserRole::Provider, "Pedro Consultor");
    let accountant = user(tenant, UserRole::Accountant, "Clara Contadora");

    for u in [&analyst, &coordinator, &provider, &accountant] {
        add_doc(store.as_ref(), &CollectionPath::users(), &u.id.as_uuid().to_string(), u)
            .await
            .unwrap();
    }

    Harness {
        engine,
        store,
        tenant,
        analyst,
        coordinator,
        provider,
        accountant,
    }
}

fn draft() -> ActivityDraft {
    ActivityDraft {
        client_id: Some(ClientId::new()),
        activity_type: Some("Auditoría Alturas".to_string()),
        description: Some("Inspección anual de trabajo en alturas".to_string()),
        priority: Some(Priority::High),
        unit: Some("Hora".to_string()),
        quantity: Some(10.0),
        value: Some(500000.0),
        ..Default::default()
    }
}

fn pdf(name: &str) -> FileUpload {
    FileUpload {
        name: name.to_string(),
        content_type: "application/pdf".to_string(),
        bytes: vec![0u8; 2048],
    }
}

fn progress(executed_units: f64, comment: &str) -> ProgressUpdate {
    ProgressUpdate {
        executed_units,
        comment: comment.to_string(),
    }
}

#[tokio::test]
async fn full_lifecycle_to_paid() -> anyhow::Result<()> {
    let h = harness().await;

    let activity = h.engine.create_activity(draft(), &h.analyst).await?;
    assert_eq!(activity.status, ActivityStatus::PendingAssignment);
    assert_eq!(activity.progress, 0);
    assert!(activity.order_number.starts_with("ORD-"));
    assert_eq!(activity.tenant_id, h.tenant);

    let activity = h
        .engine
        .assign_provider(activity.id, &h.provider, 70, &h.coordinator)
        .await?;
    assert_eq!(activity.status, ActivityStatus::Assigned);
    assert_eq!(activity.assigned_provider_id, Some(h.provider.id));
    assert!(activity.assigned_at.is_some());

    let assignments = h.engine.list_assignments(activity.id).await?;
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].provider_name, "Pedro Consultor");
    assert_eq!(assignments[0].allocation_percentage, 70);

    let activity = h
        .engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await?;
    assert_eq!(activity.status, ActivityStatus::InContact);

    let activity = h
        .engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(4.0, "Trabajo en campo iniciado"),
            &h.provider,
        )
        .await?;
    assert_eq!(activity.status, ActivityStatus::InExecution);
    assert_eq!(activity.progress, 50);

    let activity = h
        .engine
        .finalize_activity(
            activity.id,
            progress(10.0, "Trabajo terminado, informe adjunto"),
            vec![pdf("Informe Final.pdf")],
            &h.provider,
        )
        .await?;
    assert_eq!(activity.status, ActivityStatus::Finalized);
    assert_eq!(activity.progress, 100);
    assert_eq!(activity.supports.len(), 1);
    assert_eq!(activity.supports[0].name, "informe_final.pdf");

    let activity = h
        .engine
        .submit_approval(activity.id, true, "Buen trabajo", &h.coordinator)
        .await?;
    assert_eq!(activity.status, ActivityStatus::Approved);
    assert_eq!(activity.approved_by, Some(h.coordinator.id));
    let order = h
        .engine
        .get_service_order(activity.id)
        .await?
        .expect("service order generated on approval");
    assert!(order.order_number.starts_with("OS-"));
    assert_eq!(order.status, ServiceOrderStatus::Generated);
    assert_eq!(order.amount, 0.0);
    assert_eq!(order.approved_by, h.coordinator.id);

    let activity = h
        .engine
        .request_billing(activity.id, &h.coordinator)
        .await?;
    assert_eq!(activity.status, ActivityStatus::BillingRequested);
    assert_eq!(activity.ready_for_billing_by, Some(h.coordinator.id));
    assert!(activity.billing_requested_at.is_some());

    let filed = h
        .engine
        .file_receivables(&[activity.id], &h.provider)
        .await?;
    assert_eq!(filed.len(), 1);
    assert_eq!(filed[0].status, ActivityStatus::AccountReceivableFiled);
    let order = h.engine.get_service_order(activity.id).await?.expect("service order");
    assert_eq!(order.status, ServiceOrderStatus::Filed);

    let activity = h
        .engine
        .process_payment(activity.id, true, &h.accountant)
        .await?;
    assert_eq!(activity.status, ActivityStatus::Paid);
    assert!(activity.paid_at.is_some());
    let order = h.engine.get_service_order(activity.id).await?.expect("service order");
    assert_eq!(order.status, ServiceOrderStatus::Paid);

    // Nine stages, nine bitácora entries, append order preserved.
    let logs = h
        .engine
        .list_audit_log(activity.id, LogOrder::Ascending)
        .await?;
    assert_eq!(logs.len(), 9);
    assert_eq!(logs[0].comment, "Solicitud creada en el sistema");
    assert_eq!(logs[1].comment, "Asignada a Pedro Consultor (70%)");
    assert!(logs[5].comment.starts_with("Aprobada. Orden Servicio Generada: OS-"));
    assert_eq!(logs[6].comment, "Solicitud de facturación enviada a contabilidad.");
    assert_eq!(logs[7].comment, "Cuenta de cobro radicada por el consultor.");
    assert_eq!(logs[8].comment, "Pago realizado exitosamente.");

    let recent_first = h
        .engine
        .list_audit_log(activity.id, LogOrder::Descending)
        .await?;
    assert_eq!(recent_first[0].comment, "Pago realizado exitosamente.");
    Ok(())
}

#[tokio::test]
async fn approval_rejection_returns_to_execution() {
    let h = harness().await;

    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(2.0, "Avance"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .finalize_activity(
            activity.id,
            progress(10.0, "Entrega"),
            vec![pdf("acta.pdf")],
            &h.provider,
        )
        .await
        .unwrap();

    let rejected = h
        .engine
        .submit_approval(activity.id, false, "falta firma", &h.coordinator)
        .await
        .unwrap();
    assert_eq!(rejected.status, ActivityStatus::InExecution);
    assert!(rejected.service_order_id.is_none());

    let logs = h
        .engine
        .list_audit_log(activity.id, LogOrder::Descending)
        .await
        .unwrap();
    assert_eq!(
        logs[0].comment,
        "Rechazada/Requiere Ajuste. Comentarios: falta firma"
    );
    assert_eq!(logs[0].status, ActivityStatus::InExecution);

    // The consultant reworks, refinalizes, and this time it passes.
    h.engine
        .finalize_activity(
            activity.id,
            progress(10.0, "Entrega corregida"),
            vec![pdf("acta firmada.pdf")],
            &h.provider,
        )
        .await
        .unwrap();
    let approved = h
        .engine
        .submit_approval(activity.id, true, "", &h.coordinator)
        .await
        .unwrap();
    assert_eq!(approved.status, ActivityStatus::Approved);
    assert!(approved.service_order_id.is_some());
}

#[tokio::test]
async fn payment_rejection_leaves_activity_stranded() {
    let h = harness().await;

    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(5.0, "Avance"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .finalize_activity(
            activity.id,
            progress(10.0, "Entrega"),
            vec![pdf("informe.pdf")],
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .submit_approval(activity.id, true, "ok", &h.coordinator)
        .await
        .unwrap();
    h.engine
        .request_billing(activity.id, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .file_receivables(&[activity.id], &h.provider)
        .await
        .unwrap();

    let rejected = h
        .engine
        .process_payment(activity.id, false, &h.accountant)
        .await
        .unwrap();
    assert_eq!(rejected.status, ActivityStatus::Rejected);
    assert!(rejected.paid_at.is_none());

    let logs = h
        .engine
        .list_audit_log(activity.id, LogOrder::Descending)
        .await
        .unwrap();
    assert_eq!(logs[0].comment, "Pago rechazado por contabilidad.");

    // A rejected payment cannot be retried directly: the activity sits
    // in `rejected` until the work is sent back through execution.
    let err = h
        .engine
        .process_payment(activity.id, true, &h.accountant)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cuenta de cobro radicada"));
}

#[tokio::test]
async fn overallocation_is_rejected_atomically() {
    let h = harness().await;
    let laura = user(h.tenant, UserRole::Provider, "Laura Consultora");
    add_doc(
        h.store.as_ref(),
        &CollectionPath::users(),
        &laura.id.as_uuid().to_string(),
        &laura,
    )
    .await
    .unwrap();

    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 70, &h.coordinator)
        .await
        .unwrap();

    // A second allocation must fit in the remaining 30%.
    let err = h
        .engine
        .assign_provider(activity.id, &laura, 40, &h.coordinator)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("excede el 100%"));
    assert!(err.to_string().contains("Ya asignado: 70%"));
    assert_eq!(h.engine.list_assignments(activity.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_assignments_never_exceed_100() {
    let h = harness().await;
    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();

    let mut handles = Vec::new();
    for name in ["Laura Consultora", "Miguel Consultor"] {
        let consultant = user(h.tenant, UserRole::Provider, name);
        add_doc(
            h.store.as_ref(),
            &CollectionPath::users(),
            &consultant.id.as_uuid().to_string(),
            &consultant,
        )
        .await
        .unwrap();
        let engine = h.engine.clone();
        let coordinator = h.coordinator.clone();
        let id = activity.id;
        handles.push(tokio::spawn(async move {
            engine.assign_provider(id, &consultant, 60, &coordinator).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one 60% allocation may win");

    let total: u32 = h
        .engine
        .list_assignments(activity.id)
        .await
        .unwrap()
        .iter()
        .map(|a| a.allocation_percentage as u32)
        .sum();
    assert!(total <= 100);
}

#[tokio::test]
async fn approval_requires_supports() {
    let h = harness().await;
    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(2.0, "Avance"),
            &h.provider,
        )
        .await
        .unwrap();
    // The engine refuses to finalize without supports, so fabricate a
    // finalized-without-supports document straight in the store; approval
    // must still refuse it.
    h.store
        .update(
            &CollectionPath::activities(),
            &activity.id.as_uuid().to_string(),
            serde_json::json!({ "status": ActivityStatus::Finalized, "progress": 100 }),
        )
        .await
        .unwrap();

    let err = h
        .engine
        .submit_approval(activity.id, true, "", &h.coordinator)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("soportes"));
}

#[tokio::test]
async fn generic_transition_enforces_finalization_preconditions() {
    let h = harness().await;
    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(2.0, "Avance"),
            &h.provider,
        )
        .await
        .unwrap();

    // No uploaded supports and 999 executed against 10 requested: the
    // generic path must refuse `finalized` just like `finalize_activity`.
    let err = h
        .engine
        .transition_status(
            activity.id,
            ActivityStatus::Finalized,
            progress(999.0, "Terminado"),
            &h.provider,
        )
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("soportes"));
    assert!(message.contains("no pueden exceder las solicitadas"));

    let current = h.engine.get_activity(activity.id).await.unwrap();
    assert_eq!(current.status, ActivityStatus::InExecution);
    assert_eq!(current.progress, 50);
    assert!(current.supports.is_empty());
}

#[tokio::test]
async fn negative_executed_units_are_rejected() {
    let h = harness().await;
    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();

    let err = h
        .engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(-1.0, "Retroceso"),
            &h.provider,
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no pueden ser negativas"));

    let current = h.engine.get_activity(activity.id).await.unwrap();
    assert_eq!(current.status, ActivityStatus::Assigned);
}

#[tokio::test]
async fn finalization_rejects_overexecution_and_cleans_up() {
    let h = harness().await;
    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(2.0, "Avance"),
            &h.provider,
        )
        .await
        .unwrap();

    // 12 executed against 10 requested.
    let err = h
        .engine
        .finalize_activity(
            activity.id,
            progress(12.0, "Exceso"),
            vec![pdf("informe.pdf")],
            &h.provider,
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no pueden exceder las solicitadas"));

    let current = h.engine.get_activity(activity.id).await.unwrap();
    assert_eq!(current.status, ActivityStatus::InExecution);
    assert!(current.supports.is_empty());
}

#[tokio::test]
async fn role_matrix_blocks_wrong_actor() {
    let h = harness().await;
    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();

    // A provider cannot assign.
    let err = h
        .engine
        .assign_provider(activity.id, &h.provider, 50, &h.provider)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        hmh_core::WorkflowError::PermissionDenied { .. }
    ));

    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await
        .unwrap();

    // An accountant cannot report execution progress, edge or not.
    let err = h
        .engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(1.0, "intento"),
            &h.accountant,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        hmh_core::WorkflowError::PermissionDenied {
            role: UserRole::Accountant,
            target: ActivityStatus::InExecution,
        }
    ));

    // A status the table never reaches from here is an illegal edge.
    let err = h
        .engine
        .transition_status(
            activity.id,
            ActivityStatus::Paid,
            progress(0.0, "salto"),
            &h.accountant,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        hmh_core::WorkflowError::InvalidTransition {
            from: ActivityStatus::InContact,
            to: ActivityStatus::Paid,
        }
    ));
}

#[tokio::test]
async fn provider_only_sees_own_activities() {
    let h = harness().await;
    let laura = user(h.tenant, UserRole::Provider, "Laura Consultora");

    let mine = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    let other = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(mine.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .assign_provider(other.id, &laura, 100, &h.coordinator)
        .await
        .unwrap();

    let visible = h.engine.list_activities(&h.provider).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, mine.id);

    // Coordinators see the whole tenant.
    let all = h.engine.list_activities(&h.coordinator).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn billing_requires_service_order_and_supports() {
    let h = harness().await;
    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();

    let err = h
        .engine
        .request_billing(activity.id, &h.coordinator)
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Solo se puede solicitar facturación de actividades aprobadas"));
    assert!(message.contains("orden de servicio"));
}

#[tokio::test]
async fn receivable_batch_must_belong_to_filer() {
    let h = harness().await;
    let laura = user(h.tenant, UserRole::Provider, "Laura Consultora");

    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(2.0, "Avance"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .finalize_activity(
            activity.id,
            progress(10.0, "Entrega"),
            vec![pdf("informe.pdf")],
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .submit_approval(activity.id, true, "ok", &h.coordinator)
        .await
        .unwrap();

    let err = h
        .engine
        .file_receivables(&[activity.id], &laura)
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("Todas las actividades deben pertenecer al mismo consultor"));
}

/// Drive a fresh activity through assignment, execution, finalization,
/// and approval, ending in `approved`.
async fn approved_activity(h: &Harness) -> hmh_core::ActivityId {
    let activity = h.engine.create_activity(draft(), &h.analyst).await.unwrap();
    h.engine
        .assign_provider(activity.id, &h.provider, 100, &h.coordinator)
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InContact,
            progress(0.0, "Contacto inicial con el cliente"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .transition_status(
            activity.id,
            ActivityStatus::InExecution,
            progress(2.0, "Avance"),
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .finalize_activity(
            activity.id,
            progress(10.0, "Entrega"),
            vec![pdf("informe.pdf")],
            &h.provider,
        )
        .await
        .unwrap();
    h.engine
        .submit_approval(activity.id, true, "ok", &h.coordinator)
        .await
        .unwrap();
    activity.id
}

#[tokio::test]
async fn receivable_filing_requires_billing_request() {
    let h = harness().await;
    let id = approved_activity(&h).await;

    // Approved but billing never requested: the filing skips a stage.
    let err = h
        .engine
        .file_receivables(&[id], &h.provider)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no tienen facturación solicitada"));

    let current = h.engine.get_activity(id).await.unwrap();
    assert_eq!(current.status, ActivityStatus::Approved);
}

#[tokio::test]
async fn concurrent_receivable_filings_file_once() {
    let h = harness().await;
    let id = approved_activity(&h).await;
    h.engine.request_billing(id, &h.coordinator).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let engine = h.engine.clone();
        let provider = h.provider.clone();
        handles.push(tokio::spawn(async move {
            engine.file_receivables(&[id], &provider).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one filing may win");

    let current = h.engine.get_activity(id).await.unwrap();
    assert_eq!(current.status, ActivityStatus::AccountReceivableFiled);

    let filings = h
        .engine
        .list_audit_log(id, LogOrder::Ascending)
        .await
        .unwrap()
        .iter()
        .filter(|log| log.comment == "Cuenta de cobro radicada por el consultor.")
        .count();
    assert_eq!(filings, 1);
}
