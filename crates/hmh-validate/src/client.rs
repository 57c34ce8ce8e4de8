//! # Client Record Validation
//!
//! Completeness rules for client registration: name and NIT lengths,
//! phone digit pattern, address, city/department, and a responsible
//! coordinator.

use hmh_core::ClientDraft;

use crate::report::ValidationReport;

/// Whether a phone number has 7–10 digits, ignoring embedded spaces.
pub(crate) fn is_valid_phone(phone: &str) -> bool {
    let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    (7..=10).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Validate a client registration form.
pub fn validate_client_data(data: &ClientDraft) -> ValidationReport {
    let mut report = ValidationReport::new();

    let name_ok = data.name.as_deref().is_some_and(|n| n.trim().len() >= 3);
    report.push_if(!name_ok, "El nombre del cliente debe tener al menos 3 caracteres");

    let tax_id_ok = data.tax_id.as_deref().is_some_and(|t| t.trim().len() >= 9);
    report.push_if(!tax_id_ok, "El NIT debe ser válido (mínimo 9 caracteres)");

    let phone_ok = data.phone.as_deref().is_some_and(is_valid_phone);
    report.push_if(!phone_ok, "El teléfono debe tener entre 7 y 10 dígitos");

    let address_ok = data.address.as_deref().is_some_and(|a| a.trim().len() >= 5);
    report.push_if(!address_ok, "La dirección debe tener al menos 5 caracteres");

    let location_ok = data.city.as_deref().is_some_and(|c| !c.is_empty())
        && data.department.as_deref().is_some_and(|d| !d.is_empty());
    report.push_if(!location_ok, "Debe especificar ciudad y departamento");

    report.push_if(
        data.hmh_coordinator_id.is_none(),
        "Debe asignar un coordinador HMH responsable",
    );

    report
}
