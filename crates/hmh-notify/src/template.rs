//! Notification content: email subjects and bodies, and the shorter
//! in-app variants.
//!
//! Every workflow event that reaches a person is described here as a
//! [`NotificationEvent`] carrying owned snapshots of the data it renders.
//! Owned, because rendering happens on a spawned task after the workflow
//! call has already returned.

use serde::{Deserialize, Serialize};
use serde_json::json;

use hmh_core::{Activity, User};

/// Wire discriminant for persisted in-app notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ActivityAssigned,
    ActivityApproved,
    ActivityRejected,
    BillingRequested,
    PaymentProcessed,
    ServiceOrderGenerated,
}

/// A rendered email, ready to hand to a mail sender.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A rendered in-app notification, ready to persist under the
/// recipient's notification collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InAppNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// One workflow event bound for a recipient.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A provider was assigned to an activity.
    Assigned {
        activity: Activity,
        provider: User,
        client_name: String,
    },
    /// The coordinator approved the provider's finalized work.
    Approved {
        activity: Activity,
        provider: User,
        service_order_number: String,
        comments: Option<String>,
    },
    /// The coordinator rejected the work and sent it back.
    Rejected {
        activity: Activity,
        provider: User,
        comments: String,
    },
    /// Billing was requested; the accountant should invoice.
    BillingRequested {
        activity: Activity,
        accountant: User,
        client_name: String,
        service_order_number: String,
    },
    /// The accountant paid the provider's account receivable.
    PaymentProcessed {
        activity: Activity,
        provider: User,
        comments: Option<String>,
    },
    /// A service order was generated for the activity.
    ServiceOrderGenerated {
        activity: Activity,
        recipient: User,
        client_name: String,
        service_order_number: String,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::Assigned { .. } => NotificationKind::ActivityAssigned,
            NotificationEvent::Approved { .. } => NotificationKind::ActivityApproved,
            NotificationEvent::Rejected { .. } => NotificationKind::ActivityRejected,
            NotificationEvent::BillingRequested { .. } => NotificationKind::BillingRequested,
            NotificationEvent::PaymentProcessed { .. } => NotificationKind::PaymentProcessed,
            NotificationEvent::ServiceOrderGenerated { .. } => {
                NotificationKind::ServiceOrderGenerated
            }
        }
    }

    /// Who receives both the email and the in-app notification.
    pub fn recipient(&self) -> &User {
        match self {
            NotificationEvent::Assigned { provider, .. }
            | NotificationEvent::Approved { provider, .. }
            | NotificationEvent::Rejected { provider, .. }
            | NotificationEvent::PaymentProcessed { provider, .. } => provider,
            NotificationEvent::BillingRequested { accountant, .. } => accountant,
            NotificationEvent::ServiceOrderGenerated { recipient, .. } => recipient,
        }
    }

    pub fn activity(&self) -> &Activity {
        match self {
            NotificationEvent::Assigned { activity, .. }
            | NotificationEvent::Approved { activity, .. }
            | NotificationEvent::Rejected { activity, .. }
            | NotificationEvent::BillingRequested { activity, .. }
            | NotificationEvent::PaymentProcessed { activity, .. }
            | NotificationEvent::ServiceOrderGenerated { activity, .. } => activity,
        }
    }

    /// Render the email for this event.
    pub fn render_email(&self, app_url: &str) -> EmailMessage {
        let recipient = self.recipient();
        let (subject, body) = match self {
            NotificationEvent::Assigned {
                activity,
                provider,
                client_name,
            } => (
                format!("Nueva actividad asignada - {}", activity.order_number),
                format!(
                    "Hola {},\n\n\
                     Se te ha asignado una nueva actividad:\n\n\
                     📋 Orden: {}\n\
                     🏢 Cliente: {}\n\
                     📝 Tipo: {}\n\
                     📅 Fecha requerida: {}\n\
                     ⏰ Prioridad: {}\n\n\
                     Descripción:\n{}\n\n\
                     Por favor, inicia el trabajo lo antes posible y actualiza el estado en el sistema.\n\n\
                     Accede al sistema: {}\n\n\
                     Saludos,\nSistema HMH",
                    provider.name,
                    activity.order_number,
                    client_name,
                    activity.activity_type,
                    activity
                        .required_date
                        .as_ref()
                        .map(|d| d.to_date_string())
                        .unwrap_or_else(|| "Por definir".to_string()),
                    activity.priority,
                    activity.description.as_deref().unwrap_or("Sin descripción"),
                    app_url,
                ),
            ),
            NotificationEvent::Approved {
                activity,
                provider,
                service_order_number,
                comments,
            } => (
                format!("Actividad aprobada - {}", activity.order_number),
                format!(
                    "Hola {},\n\n\
                     Tu actividad ha sido aprobada:\n\n\
                     📋 Orden: {}\n\
                     ✅ Estado: Aprobada\n\
                     📄 Orden de Servicio: {}\n\
                     {}\n\
                     Ya puedes proceder con la cuenta de cobro.\n\n\
                     Accede al sistema: {}\n\n\
                     Saludos,\nSistema HMH",
                    provider.name,
                    activity.order_number,
                    service_order_number,
                    comments
                        .as_deref()
                        .map(|c| format!("\nComentarios del coordinador:\n{c}\n"))
                        .unwrap_or_default(),
                    app_url,
                ),
            ),
            NotificationEvent::Rejected {
                activity,
                provider,
                comments,
            } => (
                format!("Actividad requiere ajustes - {}", activity.order_number),
                format!(
                    "Hola {},\n\n\
                     Tu actividad requiere ajustes:\n\n\
                     📋 Orden: {}\n\
                     ⚠️ Estado: Requiere ajuste\n\
                     📝 Comentarios del coordinador:\n{}\n\n\
                     Por favor, revisa los comentarios y realiza los ajustes necesarios.\n\n\
                     Accede al sistema: {}\n\n\
                     Saludos,\nSistema HMH",
                    provider.name,
                    activity.order_number,
                    if comments.is_empty() { "Sin comentarios" } else { comments.as_str() },
                    app_url,
                ),
            ),
            NotificationEvent::BillingRequested {
                activity,
                accountant,
                client_name,
                service_order_number,
            } => (
                format!(
                    "Nueva solicitud de facturación - {}",
                    activity.order_number
                ),
                format!(
                    "Hola {},\n\n\
                     Nueva solicitud de facturación disponible:\n\n\
                     📋 Orden: {}\n\
                     🏢 Cliente: {}\n\
                     💰 Valor: ${}\n\
                     📄 Orden de Servicio: {}\n\n\
                     Por favor, procesa la facturación en el sistema contable.\n\n\
                     Accede al sistema: {}\n\n\
                     Saludos,\nSistema HMH",
                    accountant.name,
                    activity.order_number,
                    client_name,
                    format_amount(activity.value),
                    service_order_number,
                    app_url,
                ),
            ),
            NotificationEvent::PaymentProcessed {
                activity,
                provider,
                comments,
            } => (
                format!("Pago procesado - {}", activity.order_number),
                format!(
                    "Hola {},\n\n\
                     El pago de tu actividad ha sido procesado:\n\n\
                     📋 Orden: {}\n\
                     💰 Valor: ${}\n\
                     ✅ Estado: Pagado\n\
                     📅 Fecha de pago: {}\n\
                     {}\n\
                     Accede al sistema: {}\n\n\
                     Saludos,\nSistema HMH",
                    provider.name,
                    activity.order_number,
                    format_amount(activity.value),
                    hmh_core::Timestamp::now().to_date_string(),
                    comments
                        .as_deref()
                        .map(|c| format!("\nComentarios:\n{c}\n"))
                        .unwrap_or_default(),
                    app_url,
                ),
            ),
            NotificationEvent::ServiceOrderGenerated {
                activity,
                recipient,
                client_name,
                service_order_number,
            } => (
                format!(
                    "Orden de servicio generada - {service_order_number}"
                ),
                format!(
                    "Hola {},\n\n\
                     Se ha generado una orden de servicio:\n\n\
                     📋 Actividad: {}\n\
                     📄 Orden de Servicio: {}\n\
                     🏢 Cliente: {}\n\
                     💰 Valor: ${}\n\n\
                     La orden de servicio está lista para ser facturada.\n\n\
                     Accede al sistema: {}\n\n\
                     Saludos,\nSistema HMH",
                    recipient.name,
                    activity.order_number,
                    service_order_number,
                    client_name,
                    format_amount(activity.value),
                    app_url,
                ),
            ),
        };
        EmailMessage {
            to: recipient.email.clone(),
            subject,
            body,
        }
    }

    /// Render the in-app variant: short title and one-line message.
    pub fn render_in_app(&self) -> InAppNotification {
        let (title, message) = match self {
            NotificationEvent::Assigned {
                activity,
                client_name,
                ..
            } => (
                "Nueva actividad asignada".to_string(),
                format!(
                    "Se te ha asignado la actividad {} - {}",
                    activity.order_number, client_name
                ),
            ),
            NotificationEvent::Approved {
                activity,
                service_order_number,
                ..
            } => (
                "Actividad aprobada".to_string(),
                format!(
                    "Tu actividad {} ha sido aprobada. OS: {}",
                    activity.order_number, service_order_number
                ),
            ),
            NotificationEvent::Rejected {
                activity, comments, ..
            } => (
                "Actividad requiere ajustes".to_string(),
                format!(
                    "La actividad {} requiere ajustes: {}",
                    activity.order_number, comments
                ),
            ),
            NotificationEvent::BillingRequested { activity, .. } => (
                "Nueva solicitud de facturación".to_string(),
                format!(
                    "Actividad {} lista para facturar",
                    activity.order_number
                ),
            ),
            NotificationEvent::PaymentProcessed { activity, .. } => (
                "Pago procesado".to_string(),
                format!(
                    "El pago de la actividad {} ha sido procesado",
                    activity.order_number
                ),
            ),
            NotificationEvent::ServiceOrderGenerated {
                activity,
                service_order_number,
                ..
            } => (
                "Orden de servicio generada".to_string(),
                format!(
                    "Orden de servicio {} generada para la actividad {}",
                    service_order_number, activity.order_number
                ),
            ),
        };
        InAppNotification {
            kind: self.kind(),
            title,
            message,
            read: false,
            created_at: hmh_core::Timestamp::now().to_iso8601(),
            metadata: Some(json!({ "activityId": self.activity().id })),
        }
    }
}

/// Thousands-grouped amount for display, e.g. `500000.0` → `500,000`.
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = value.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}
