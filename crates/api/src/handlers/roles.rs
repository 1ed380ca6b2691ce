//! Handlers for `/admin/roles`.

use a4l_core::capability::CapabilityFlags;
use a4l_core::registry::RoleRegistry;
use a4l_core::roles::{Role, RoleSummary, RoleUpdate};
use a4l_core::types::DbId;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAdminAccess;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/roles`. Omitted flags default to `false`.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(flatten)]
    pub flags: CapabilityFlags,
}

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
) -> AppResult<Json<DataResponse<Vec<RoleSummary>>>> {
    let roles = RoleRegistry::new(state.store.as_ref())
        .list(&principal)
        .await?;
    Ok(Json(DataResponse { data: roles }))
}

/// GET /api/v1/admin/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Role>>> {
    let role = RoleRegistry::new(state.store.as_ref())
        .find(&principal, id)
        .await?;
    Ok(Json(DataResponse { data: role }))
}

/// POST /api/v1/admin/roles
pub async fn create_role(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    AppJson(input): AppJson<CreateRoleRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Role>>)> {
    let role = RoleRegistry::new(state.store.as_ref())
        .create(&principal, &input.name, input.flags)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// PUT /api/v1/admin/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<RoleUpdate>,
) -> AppResult<Json<DataResponse<Role>>> {
    let role = RoleRegistry::new(state.store.as_ref())
        .update(&principal, id, &input)
        .await?;
    Ok(Json(DataResponse { data: role }))
}

/// DELETE /api/v1/admin/roles/{id}
///
/// Accounts holding the role are detached and lose all capabilities.
pub async fn delete_role(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    RoleRegistry::new(state.store.as_ref())
        .delete(&principal, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
