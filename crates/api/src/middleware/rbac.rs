//! Capability-based access extractors.
//!
//! These gate whole route groups. Services still check the specific
//! capability of each operation through the authorization guard.

use a4l_core::authorization::require;
use a4l_core::capability::Capability;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthPrincipal;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `access_admin` capability. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdminAccess(principal): RequireAdminAccess) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdminAccess(pub a4l_core::principal::Principal);

impl FromRequestParts<AppState> for RequireAdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthPrincipal(principal) = AuthPrincipal::from_request_parts(parts, state).await?;
        require(&principal, Capability::AccessAdmin)?;
        Ok(RequireAdminAccess(principal))
    }
}
