//! # hmh-notify
//!
//! Notification layer for the HMH workflow: Spanish email and in-app
//! templates for each workflow event, and a dispatcher that delivers
//! them fire-and-forget.
//!
//! Delivery is decoupled from state: the workflow engine records the
//! transition first and then hands the event here. Failures are logged
//! with `tracing` and never surface to the caller.

pub mod dispatcher;
pub mod template;

pub use dispatcher::{Dispatcher, LogMailSender, MailSender, NotifyError};
pub use template::{
    EmailMessage, InAppNotification, NotificationEvent, NotificationKind, format_amount,
};
