//! # Consultant Profile Validation
//!
//! Completeness rules for consultant (provider) registration and for the
//! per-client rate table entries used by billing.

use serde::{Deserialize, Serialize};

use hmh_core::{ClientId, UserId};

use crate::client::is_valid_phone;
use crate::report::ValidationReport;

/// Partial input for registering a consultant profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub profession: Option<String>,
}

/// Partial input for a consultant rate entry (unit price a consultant
/// bills a given client).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantRateDraft {
    pub provider_id: Option<UserId>,
    pub client_id: Option<ClientId>,
    pub unit: Option<String>,
    pub value: Option<f64>,
}

/// Minimal shape check for an email address: one `@` with a dot after it.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !local.contains(char::is_whitespace)
                && domain.contains('.')
                && !domain.contains(char::is_whitespace)
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Validate a consultant registration form.
pub fn validate_consultant_data(data: &ConsultantDraft) -> ValidationReport {
    let mut report = ValidationReport::new();

    let name_ok = data.name.as_deref().is_some_and(|n| n.trim().len() >= 3);
    report.push_if(!name_ok, "El nombre debe tener al menos 3 caracteres");

    let email_ok = data.email.as_deref().is_some_and(is_plausible_email);
    report.push_if(!email_ok, "El email debe ser válido");

    let document_ok = data.document_type.as_deref().is_some_and(|t| !t.is_empty())
        && data.document_number.as_deref().is_some_and(|n| !n.is_empty());
    report.push_if(!document_ok, "Debe especificar tipo y número de documento");

    if let Some(number) = data.document_number.as_deref() {
        report.push_if(
            !number.is_empty() && number.len() < 6,
            "El número de documento debe tener al menos 6 caracteres",
        );
    }

    let phone_ok = data.phone.as_deref().is_some_and(is_valid_phone);
    report.push_if(!phone_ok, "El teléfono debe tener entre 7 y 10 dígitos");

    report.push_if(
        !data.profession.as_deref().is_some_and(|p| !p.is_empty()),
        "Debe especificar la profesión",
    );

    report
}

/// Validate a consultant rate entry.
pub fn validate_consultant_rate(data: &ConsultantRateDraft) -> ValidationReport {
    let mut report = ValidationReport::new();

    report.push_if(data.provider_id.is_none(), "Debe seleccionar un consultor");
    report.push_if(data.client_id.is_none(), "Debe seleccionar un cliente");
    report.push_if(
        !data.unit.as_deref().is_some_and(|u| !u.is_empty()),
        "Debe especificar la unidad (Hora, Visita, Informe, etc.)",
    );
    report.push_if(
        !data.value.is_some_and(|v| v > 0.0),
        "El valor debe ser mayor a cero",
    );

    report
}
