//! Fire-and-forget notification dispatch.
//!
//! Workflow transitions hand a [`NotificationEvent`] to the
//! [`Dispatcher`] and move on. Delivery runs on a spawned task: the
//! email and the in-app record are attempted concurrently, and a
//! failure of either is logged and dropped. A lost notification must
//! never roll back or delay a state change that already happened.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use hmh_store::{CollectionPath, DocumentStore};

use crate::template::NotificationEvent;

/// Failure to deliver a notification. Logged, never propagated into
/// workflow results.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail delivery failed: {0}")]
    Mail(String),
    #[error(transparent)]
    Store(#[from] hmh_store::StoreError),
}

/// Outbound email transport.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Mail sender that writes the message to the log instead of sending.
/// Stands in until a real transport is wired up.
#[derive(Debug, Default)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(%to, %subject, body_len = body.len(), "email notification (log transport)");
        tracing::debug!(%body);
        Ok(())
    }
}

/// Renders events and delivers them over both channels.
#[derive(Clone)]
pub struct Dispatcher {
    mailer: Arc<dyn MailSender>,
    store: Arc<dyn DocumentStore>,
    app_url: String,
}

impl Dispatcher {
    pub fn new(mailer: Arc<dyn MailSender>, store: Arc<dyn DocumentStore>, app_url: impl Into<String>) -> Self {
        Self {
            mailer,
            store,
            app_url: app_url.into(),
        }
    }

    /// Spawn delivery of `event` and return immediately.
    pub fn notify(&self, event: NotificationEvent) {
        let this = self.clone();
        tokio::spawn(async move {
            this.deliver(event).await;
        });
    }

    /// Deliver both channels, logging failures. Exposed separately so
    /// tests can await delivery instead of racing the spawned task.
    pub async fn deliver(&self, event: NotificationEvent) {
        let email = event.render_email(&self.app_url);
        let in_app = event.render_in_app();
        let recipient_id = event.recipient().id;

        let send_mail = self.mailer.send(&email.to, &email.subject, &email.body);
        let save_in_app = async {
            let doc = serde_json::to_value(&in_app).map_err(hmh_store::StoreError::from)?;
            self.store
                .add(
                    &CollectionPath::user_notifications(recipient_id),
                    &Uuid::new_v4().to_string(),
                    doc,
                )
                .await
                .map_err(NotifyError::from)
        };

        let (mail_result, in_app_result) = tokio::join!(send_mail, save_in_app);
        if let Err(err) = mail_result {
            tracing::warn!(recipient = %email.to, error = %err, "email notification failed");
        }
        if let Err(err) = in_app_result {
            tracing::warn!(recipient = %recipient_id, error = %err, "in-app notification failed");
        }
    }
}
