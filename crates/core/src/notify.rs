//! Out-of-band notification contract.
//!
//! The workflow and verification services describe *what* to tell an address
//! through [`Notification`]; a [`Notifier`] implementation decides how to
//! deliver it (SMTP, log output, or an in-memory recorder in tests).

use async_trait::async_trait;

/// Product name used in notification subjects.
const SITE_NAME: &str = "Catalogue Véhicule A4L";

/// Error returned when a notification could not be delivered.
#[derive(Debug, thiserror::Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// A message for a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Six-digit account verification code.
    VerificationCode { username: String, code: String },
    /// Link confirming a requested email change (sent before application).
    EmailChangeRequested {
        username: String,
        new_email: String,
        link: String,
    },
    /// An email change was applied (sent to both old and new address).
    EmailChanged {
        username: String,
        old_email: String,
        new_email: String,
    },
    /// Link confirming a requested password change.
    PasswordChangeRequested { username: String, link: String },
    /// A password change was applied.
    PasswordChanged { username: String },
}

impl Notification {
    /// Short template identifier, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::VerificationCode { .. } => "verification_code",
            Notification::EmailChangeRequested { .. } => "email_change_requested",
            Notification::EmailChanged { .. } => "email_changed",
            Notification::PasswordChangeRequested { .. } => "password_change_requested",
            Notification::PasswordChanged { .. } => "password_changed",
        }
    }

    pub fn subject(&self) -> String {
        let topic = match self {
            Notification::VerificationCode { .. } => "Vérification de votre compte",
            Notification::EmailChangeRequested { .. } => "Confirmez le changement d'e-mail",
            Notification::EmailChanged { .. } => "Adresse e-mail modifiée",
            Notification::PasswordChangeRequested { .. } => {
                "Confirmez le changement de mot de passe"
            }
            Notification::PasswordChanged { .. } => "Mot de passe modifié",
        };
        format!("{topic} - {SITE_NAME}")
    }

    /// Plain-text body.
    pub fn body(&self) -> String {
        match self {
            Notification::VerificationCode { username, code } => format!(
                "Bonjour {username},\n\nVotre code de vérification est : {code}\n\
                 Ce code expire dans 10 minutes."
            ),
            Notification::EmailChangeRequested {
                username,
                new_email,
                link,
            } => format!(
                "Bonjour {username},\n\nUne demande de changement d'adresse e-mail vers \
                 {new_email} a été faite.\nConfirmez-la en ouvrant ce lien (valide 1 heure) :\n\
                 {link}\n\nSi vous n'êtes pas à l'origine de cette demande, ignorez ce message."
            ),
            Notification::EmailChanged {
                username,
                old_email,
                new_email,
            } => format!(
                "Bonjour {username},\n\nL'adresse e-mail de votre compte est passée de \
                 {old_email} à {new_email}."
            ),
            Notification::PasswordChangeRequested { username, link } => format!(
                "Bonjour {username},\n\nUne demande de changement de mot de passe a été faite.\n\
                 Confirmez-la en ouvrant ce lien (valide 1 heure) :\n{link}\n\n\
                 Si vous n'êtes pas à l'origine de cette demande, ignorez ce message."
            ),
            Notification::PasswordChanged { username } => format!(
                "Bonjour {username},\n\nLe mot de passe de votre compte a été modifié."
            ),
        }
    }
}

/// Delivers notifications to an address.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, address: &str, notification: &Notification) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_contains_link() {
        let n = Notification::PasswordChangeRequested {
            username: "alice".into(),
            link: "http://x/account/confirm-password?token=abc".into(),
        };
        assert!(n.body().contains("confirm-password?token=abc"));
        assert!(n.subject().ends_with(SITE_NAME));
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            Notification::VerificationCode { username: String::new(), code: String::new() }.kind(),
            Notification::PasswordChanged { username: String::new() }.kind(),
        ];
        assert_ne!(kinds[0], kinds[1]);
    }
}
