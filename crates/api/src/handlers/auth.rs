//! Handlers for the `/auth` resource (registration, verification, login).

use a4l_core::accounts::{AccountService, Registration};
use a4l_core::account::AccountResponse;
use a4l_core::principal::{Principal, PrincipalResolver};
use a4l_core::verification::VerificationService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::issue_session_token;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/verify-code`.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// Request body for `POST /auth/resend-code`.
#[derive(Debug, Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Identity and effective capabilities at login time.
    pub principal: Principal,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an unverified account and email it a verification code.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<Registration>,
) -> AppResult<(StatusCode, Json<DataResponse<AccountResponse>>)> {
    let service = AccountService::new(state.store.as_ref(), state.notifier.as_ref());
    let account = service.register(&input).await?;
    let view = service.view(&account).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// POST /api/v1/auth/verify-code
pub async fn verify_code(
    State(state): State<AppState>,
    AppJson(input): AppJson<VerifyCodeRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    VerificationService::new(state.store.as_ref(), state.notifier.as_ref())
        .verify(input.email.trim(), input.code.trim())
        .await?;
    Ok(Json(DataResponse {
        data: MessageResponse {
            message: "Account verified",
        },
    }))
}

/// POST /api/v1/auth/resend-code
///
/// Issue a fresh code and reset the attempt counter.
pub async fn resend_code(
    State(state): State<AppState>,
    AppJson(input): AppJson<ResendCodeRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    VerificationService::new(state.store.as_ref(), state.notifier.as_ref())
        .resend(input.email.trim())
        .await?;
    Ok(Json(DataResponse {
        data: MessageResponse {
            message: "Verification code sent",
        },
    }))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns a session token and the
/// caller's effective capabilities.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let principal = PrincipalResolver::new(state.store.as_ref())
        .resolve(input.username.trim(), &input.password)
        .await?;

    let jwt = &state.config.jwt;
    let access_token = issue_session_token(&principal, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(account_id = principal.account_id, "Login succeeded");
    Ok(Json(AuthResponse {
        access_token,
        expires_in: jwt.expires_in(),
        principal,
    }))
}
