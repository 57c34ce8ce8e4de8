//! # Activity Lifecycle Validation
//!
//! The transition guards of the workflow engine: creation completeness,
//! assignment allocation (the ≤100% invariant), status-change legality
//! against the transition table and role matrix, finalization, and
//! approval preconditions.
//!
//! Every function here is pure. Context that would otherwise require I/O
//! — today's date, the existing assignment rows — is a parameter.

use chrono::NaiveDate;

use hmh_core::{
    Activity, ActivityAssignment, ActivityDraft, ActivityStatus, SupportFile, User, UserRole,
    WorkflowError,
};

use crate::report::ValidationReport;

/// Validate an activity creation request.
///
/// `today` is the acting day in the tenant's reckoning (UTC date in
/// practice); a required date earlier than it is rejected.
pub fn validate_activity_creation(data: &ActivityDraft, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.push_if(data.client_id.is_none(), "Debe seleccionar un cliente");
    report.push_if(
        !data.activity_type.as_deref().is_some_and(|t| !t.is_empty()),
        "Debe seleccionar un tipo de actividad",
    );

    let unit_ok = data.unit.as_deref().is_some_and(|u| !u.is_empty());
    let quantity_ok = data.quantity.is_some_and(|q| q > 0.0);
    report.push_if(!unit_ok || !quantity_ok, "Debe especificar unidad y cantidad válida");

    report.push_if(
        !data.value.is_some_and(|v| v >= 0.0),
        "El valor debe ser mayor o igual a cero",
    );

    if let Some(required) = &data.required_date {
        report.push_if(
            required.date_utc() < today,
            "La fecha requerida no puede ser anterior a hoy",
        );
    }

    report
}

/// Validate assigning `provider` a share of `activity`.
///
/// Enforces the one quantitative resource invariant of the system: the
/// allocation percentages of one activity sum to at most 100. The caller
/// supplies the existing rows; the engine reads them under the activity's
/// lock so two concurrent assignments cannot both pass this check.
pub fn validate_activity_assignment(
    activity: &Activity,
    provider: &User,
    allocation_percentage: u8,
    existing: &[ActivityAssignment],
) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.push_if(
        activity.status != ActivityStatus::PendingAssignment,
        "Solo se pueden asignar actividades en estado \"Pendiente por asignar\"",
    );

    report.push_if(!provider.is_active(), "El consultor debe estar activo");

    report.push_if(
        provider.role != UserRole::Provider,
        "Solo se pueden asignar usuarios con rol de consultor",
    );

    report.push_if(
        provider.tenant_id != Some(activity.tenant_id),
        "El consultor debe pertenecer al mismo tenant",
    );

    report.push_if(
        allocation_percentage == 0 || allocation_percentage > 100,
        "El porcentaje de asignación debe estar entre 1 y 100",
    );

    let total_existing: u32 = existing.iter().map(|a| a.allocation_percentage as u32).sum();
    let total_new = total_existing + allocation_percentage as u32;
    report.push_if(
        total_new > 100,
        format!("La asignación total ({total_new}%) excede el 100%. Ya asignado: {total_existing}%"),
    );

    report.push_if(
        existing.iter().any(|a| a.provider_id == provider.id),
        "El consultor ya está asignado a esta actividad",
    );

    report
}

/// Check a status change against the transition table and the
/// role-permission matrix.
///
/// Unlike the [`ValidationReport`] rules, a violation here is not a
/// business-rule message for the acting user: a missing edge means the
/// caller offered an action the table forbids, and a role mismatch means
/// the wrong actor. Both surface as the dedicated
/// [`WorkflowError::InvalidTransition`] and
/// [`WorkflowError::PermissionDenied`] variants. The table is consulted
/// first.
pub fn validate_status_change(
    current: ActivityStatus,
    new: ActivityStatus,
    role: UserRole,
) -> Result<(), WorkflowError> {
    if !current.can_transition_to(new) {
        return Err(WorkflowError::InvalidTransition {
            from: current,
            to: new,
        });
    }

    if !role.may_set_status(new) {
        return Err(WorkflowError::PermissionDenied { role, target: new });
    }

    Ok(())
}

/// Validate finalizing an activity: executed units must be positive and
/// must not exceed the requested quantity (over-production is rejected,
/// not clamped), and at least one support document is mandatory.
pub fn validate_activity_finalization(
    activity: &Activity,
    executed_units: f64,
    supports: &[SupportFile],
) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.push_if(
        activity.status != ActivityStatus::InExecution,
        "Solo se pueden finalizar actividades en ejecución",
    );

    report.push_if(executed_units <= 0.0, "Debe especificar las unidades ejecutadas");

    report.push_if(
        executed_units > activity.quantity,
        format!(
            "Las unidades ejecutadas ({executed_units}) no pueden exceder las solicitadas ({})",
            activity.quantity
        ),
    );

    report.push_if(supports.is_empty(), "Debe subir al menos un soporte obligatorio");

    report
}

/// Validate an approval or rejection decision on finalized work.
pub fn validate_activity_approval(activity: &Activity, approver_role: UserRole) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.push_if(
        activity.status != ActivityStatus::Finalized,
        "Solo se pueden aprobar actividades finalizadas",
    );

    report.push_if(
        !activity.has_supports(),
        "La actividad debe tener soportes para ser aprobada",
    );

    report.push_if(
        !approver_role.may_approve(),
        "Solo coordinadores y administradores pueden aprobar actividades",
    );

    report
}
