//! # Billing & Payment Validation
//!
//! Preconditions of the billing tail: requesting billing on an approved
//! activity, filing a batch of activities as one account receivable, and
//! processing the payment.

use hmh_core::{Activity, ActivityStatus, UserId, UserRole};

use crate::report::ValidationReport;

/// Validate requesting billing for an approved activity.
pub fn validate_billing_request(activity: &Activity) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.push_if(
        activity.status != ActivityStatus::Approved,
        "Solo se puede solicitar facturación de actividades aprobadas",
    );

    report.push_if(
        activity.service_order_id.is_none(),
        "La actividad debe tener una orden de servicio generada",
    );

    report.push_if(!activity.has_supports(), "La actividad debe tener soportes");

    report
}

/// Validate filing a batch of activities as one account receivable for
/// `provider_id`. Every selected activity must have billing requested,
/// belong to the same provider, and not already be filed.
pub fn validate_receivable_batch(activities: &[Activity], provider_id: UserId) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.push_if(activities.is_empty(), "Debe seleccionar al menos una actividad");

    let not_requested = activities
        .iter()
        .filter(|a| a.status != ActivityStatus::BillingRequested)
        .count();
    report.push_if(
        not_requested > 0,
        format!("{not_requested} actividades no tienen facturación solicitada"),
    );

    let wrong_provider = activities
        .iter()
        .filter(|a| a.assigned_provider_id != Some(provider_id))
        .count();
    report.push_if(
        wrong_provider > 0,
        "Todas las actividades deben pertenecer al mismo consultor",
    );

    let already_filed = activities
        .iter()
        .filter(|a| {
            matches!(
                a.status,
                ActivityStatus::AccountReceivableFiled | ActivityStatus::Paid
            )
        })
        .count();
    report.push_if(
        already_filed > 0,
        format!("{already_filed} actividades ya tienen cuenta de cobro radicada"),
    );

    report
}

/// Validate processing the payment of a filed account receivable.
pub fn validate_payment(activity: &Activity, payer_role: UserRole) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.push_if(
        activity.status != ActivityStatus::AccountReceivableFiled,
        "Solo se pueden pagar actividades con cuenta de cobro radicada",
    );

    report.push_if(
        !payer_role.may_process_payments(),
        "Solo contabilidad y administradores pueden procesar pagos",
    );

    report
}
