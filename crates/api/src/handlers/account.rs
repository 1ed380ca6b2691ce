//! Handlers for the signed-in account (`/account`).

use std::collections::BTreeMap;

use a4l_core::account::{AccountResponse, ChangeKind};
use a4l_core::accounts::AccountService;
use a4l_core::capability::CapabilityFlags;
use a4l_core::theme::compute_theme_variables;
use a4l_core::types::Timestamp;
use a4l_core::workflow::ConfirmationWorkflow;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthPrincipal;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /account`. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub theme_color: Option<String>,
}

/// Request body for `PUT /account/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// The signed-in account with its capabilities and theme.
#[derive(Debug, Serialize)]
pub struct AccountProfile {
    #[serde(flatten)]
    pub account: AccountResponse,
    pub capabilities: CapabilityFlags,
    /// CSS custom properties derived from `theme_color`.
    pub theme: BTreeMap<&'static str, String>,
}

/// A staged change waiting for its confirmation link.
#[derive(Debug, Serialize)]
pub struct PendingConfirmation {
    pub kind: ChangeKind,
    pub expires_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct UpdateAccountResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    /// Set when an email change was staged and a link sent.
    pub pending: Option<PendingConfirmation>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/account
pub async fn get_account(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
) -> AppResult<Json<DataResponse<AccountProfile>>> {
    let service = AccountService::new(state.store.as_ref(), state.notifier.as_ref());
    let account = service.profile(&principal).await?;
    let theme = compute_theme_variables(account.theme_color.as_deref());

    Ok(Json(DataResponse {
        data: AccountProfile {
            account: service.view(&account).await?,
            capabilities: principal.capabilities,
            theme,
        },
    }))
}

/// PUT /api/v1/account
///
/// Username and theme apply immediately. A new email is staged and must be
/// confirmed through the emailed link. Every part is validated, and the email
/// change staged, before the profile is written, so a rejected request
/// changes nothing.
pub async fn update_account(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    AppJson(input): AppJson<UpdateAccountRequest>,
) -> AppResult<Json<DataResponse<UpdateAccountResponse>>> {
    let service = AccountService::new(state.store.as_ref(), state.notifier.as_ref());
    let update = service
        .prepare_profile_update(
            &principal,
            input.username.as_deref(),
            input.theme_color.as_deref(),
        )
        .await?;

    let current_email = update.account().email.as_deref();
    let new_email = input
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty() && Some(*e) != current_email);

    let pending = match new_email {
        Some(email) => {
            let staged = ConfirmationWorkflow::new(
                state.store.as_ref(),
                state.notifier.as_ref(),
                &state.config.public_base_url,
            )
            .request_email_change(&principal, principal.account_id, email)
            .await?;
            Some(PendingConfirmation {
                kind: ChangeKind::Email,
                expires_at: staged.expires_at,
            })
        }
        None => None,
    };

    let account = service.apply_profile_update(update).await?;
    Ok(Json(DataResponse {
        data: UpdateAccountResponse {
            account: service.view(&account).await?,
            pending,
        },
    }))
}

/// PUT /api/v1/account/password
///
/// Stage a new password; it applies once the emailed link is opened.
pub async fn change_password(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<DataResponse<PendingConfirmation>>> {
    let workflow = ConfirmationWorkflow::new(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.config.public_base_url,
    );
    let staged = workflow
        .request_password_change(
            &principal,
            principal.account_id,
            Some(&input.current_password),
            &input.new_password,
        )
        .await?;

    Ok(Json(DataResponse {
        data: PendingConfirmation {
            kind: ChangeKind::Password,
            expires_at: staged.expires_at,
        },
    }))
}

/// DELETE /api/v1/account
pub async fn delete_account(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
) -> AppResult<StatusCode> {
    AccountService::new(state.store.as_ref(), state.notifier.as_ref())
        .delete_self(&principal)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
