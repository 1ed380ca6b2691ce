//! Handlers for site-wide settings.

use a4l_core::site::{SiteService, SiteSettings};
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAdminAccess;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/site-settings
pub async fn public_settings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SiteSettings>>> {
    let settings = SiteService::new(state.store.as_ref()).settings().await?;
    Ok(Json(DataResponse { data: settings }))
}

/// GET /api/v1/admin/settings
pub async fn admin_settings(
    State(state): State<AppState>,
    RequireAdminAccess(_principal): RequireAdminAccess,
) -> AppResult<Json<DataResponse<SiteSettings>>> {
    let settings = SiteService::new(state.store.as_ref()).settings().await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/admin/settings
pub async fn update_settings(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    AppJson(input): AppJson<SiteSettings>,
) -> AppResult<Json<DataResponse<SiteSettings>>> {
    let settings = SiteService::new(state.store.as_ref())
        .update(&principal, &input)
        .await?;
    Ok(Json(DataResponse { data: settings }))
}
