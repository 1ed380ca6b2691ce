//! Confirmation-link endpoints (`/account/confirm-email`, `/account/confirm-password`).
//!
//! These are opened from an email client, so they answer with a redirect to
//! the account page carrying the outcome in the query string.

use a4l_core::account::ChangeKind;
use a4l_core::error::CoreError;
use a4l_core::workflow::ConfirmationWorkflow;
use axum::extract::{Query, State};
use axum::response::Redirect;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub token: Option<String>,
}

/// Query value reported for each failure.
fn error_code(err: &CoreError) -> &'static str {
    match err {
        CoreError::TokenNotFound => "token-invalide",
        CoreError::TokenExpired => "token-expire",
        CoreError::InvalidRequestState(_) | CoreError::DuplicateName(_) => "demande-invalide",
        other => {
            tracing::error!(error = %other, "Confirmation failed");
            "erreur-serveur"
        }
    }
}

fn success_flag(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Email => "email-changed=true",
        ChangeKind::Password => "password-changed=true",
    }
}

async fn confirm(state: &AppState, kind: ChangeKind, token: Option<String>) -> Redirect {
    let base = &state.config.public_base_url;
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        return Redirect::to(&format!("{base}/account?error=token-manquant"));
    };

    let workflow = ConfirmationWorkflow::new(
        state.store.as_ref(),
        state.notifier.as_ref(),
        base,
    );
    match workflow.confirm(kind, token.trim()).await {
        Ok(applied) => {
            tracing::info!(account_id = applied.account.id, %kind, "Change confirmed");
            Redirect::to(&format!("{base}/account?{}", success_flag(kind)))
        }
        Err(err) => {
            tracing::info!(%kind, error = %err, "Confirmation rejected");
            Redirect::to(&format!("{base}/account?error={}", error_code(&err)))
        }
    }
}

/// GET /account/confirm-email?token=
pub async fn confirm_email(
    State(state): State<AppState>,
    Query(query): Query<ConfirmQuery>,
) -> Redirect {
    confirm(&state, ChangeKind::Email, query.token).await
}

/// GET /account/confirm-password?token=
pub async fn confirm_password(
    State(state): State<AppState>,
    Query(query): Query<ConfirmQuery>,
) -> Redirect {
    confirm(&state, ChangeKind::Password, query.token).await
}
