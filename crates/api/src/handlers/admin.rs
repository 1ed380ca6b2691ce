//! Handlers for `/admin/users`. Every route requires `access_admin`; the
//! services additionally require `manage_users`.

use a4l_core::account::{AccountResponse, ChangeKind};
use a4l_core::accounts::AccountService;
use a4l_core::types::DbId;
use a4l_core::workflow::ConfirmationWorkflow;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::account::PendingConfirmation;
use crate::middleware::rbac::RequireAdminAccess;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `PUT /admin/users/{id}/role`. `null` detaches the role.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: Option<DbId>,
}

/// Request body for `PUT /admin/users/{id}/email`.
#[derive(Debug, Deserialize)]
pub struct ChangeEmailRequest {
    pub email: String,
}

/// Request body for `PUT /admin/users/{id}/password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
) -> AppResult<Json<DataResponse<Vec<AccountResponse>>>> {
    let users = AccountService::new(state.store.as_ref(), state.notifier.as_ref())
        .list(&principal)
        .await?;
    Ok(Json(DataResponse { data: users }))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn assign_role(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<AssignRoleRequest>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let service = AccountService::new(state.store.as_ref(), state.notifier.as_ref());
    let account = service.assign_role(&principal, id, input.role_id).await?;
    Ok(Json(DataResponse {
        data: service.view(&account).await?,
    }))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    AccountService::new(state.store.as_ref(), state.notifier.as_ref())
        .delete_account(&principal, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/users/{id}/email
///
/// Stage an email change on another account. The owner still confirms it.
pub async fn change_email(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ChangeEmailRequest>,
) -> AppResult<Json<DataResponse<PendingConfirmation>>> {
    let staged = ConfirmationWorkflow::new(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.config.public_base_url,
    )
    .request_email_change(&principal, id, &input.email)
    .await?;

    Ok(Json(DataResponse {
        data: PendingConfirmation {
            kind: ChangeKind::Email,
            expires_at: staged.expires_at,
        },
    }))
}

/// PUT /api/v1/admin/users/{id}/password
///
/// Stage a password reset on another account, confirmed by its owner.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<DataResponse<PendingConfirmation>>> {
    let staged = ConfirmationWorkflow::new(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.config.public_base_url,
    )
    .request_password_change(&principal, id, None, &input.new_password)
    .await?;

    Ok(Json(DataResponse {
        data: PendingConfirmation {
            kind: ChangeKind::Password,
            expires_at: staged.expires_at,
        },
    }))
}
