//! Session extractor.

use a4l_core::error::CoreError;
use a4l_core::principal::{Principal, PrincipalResolver};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::jwt::decode_session_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, resolved from `Authorization: Bearer <token>`.
///
/// The token only names the account. Role and capabilities are reloaded from
/// storage on every request, so a role change applies to sessions already
/// open and a deleted account is rejected with 401.
///
/// ```ignore
/// async fn handler(AuthPrincipal(principal): AuthPrincipal) -> AppResult<Json<()>> {
///     require(&principal, Capability::EditBrands)?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub Principal);

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

/// The token part of a bearer `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = decode_session_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            unauthorized("Invalid or expired token")
        })?;

        PrincipalResolver::new(state.store.as_ref())
            .for_account(claims.sub)
            .await
            .map(AuthPrincipal)
            .map_err(AppError::from)
    }
}
