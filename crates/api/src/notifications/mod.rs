//! Notification delivery.
//!
//! - [`email::SmtpNotifier`] -- sends notifications through SMTP.
//! - [`LogNotifier`] -- writes them to the log when SMTP is not configured.

pub mod email;

use a4l_core::notify::{Notification, NotifyError, Notifier};
use async_trait::async_trait;

/// Development notifier: logs every notification, including links and codes.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, address: &str, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            to = address,
            kind = notification.kind(),
            subject = %notification.subject(),
            body = %notification.body(),
            "Notification (SMTP not configured)",
        );
        Ok(())
    }
}
