//! Handlers for player-run dealerships and the in-game directory.
//!
//! Listing and detail are public. Edits and member changes take an
//! [`AuthPrincipal`]; the dealership service decides from the caller's
//! membership and capabilities.

use a4l_core::authorization::MembershipRole;
use a4l_core::dealership::{
    Dealership, DealershipDetail, DealershipInput, DealershipService, DealershipSummary,
    DealershipUpdate, Member, MyDealership,
};
use a4l_core::directory::{DirectoryEntry, DIRECTORY};
use a4l_core::types::DbId;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthPrincipal;
use crate::middleware::rbac::RequireAdminAccess;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/dealerships`.
#[derive(Debug, Deserialize)]
pub struct CreateDealershipRequest {
    #[serde(flatten)]
    pub dealership: DealershipInput,
    pub owner_id: DbId,
}

/// Request body for `POST /dealerships/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub account_id: DbId,
    pub role: MembershipRole,
}

/// GET /api/v1/directory
pub async fn directory() -> Json<DataResponse<Vec<DirectoryEntry>>> {
    Json(DataResponse {
        data: DIRECTORY.to_vec(),
    })
}

/// GET /api/v1/dealerships
pub async fn list_dealerships(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<DealershipSummary>>>> {
    let list = DealershipService::new(state.store.as_ref()).list().await?;
    Ok(Json(DataResponse { data: list }))
}

/// GET /api/v1/dealerships/{id}
pub async fn get_dealership(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DealershipDetail>>> {
    let detail = DealershipService::new(state.store.as_ref()).get(id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/dealerships/my-dealership
pub async fn my_dealership(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
) -> AppResult<Json<DataResponse<MyDealership>>> {
    let mine = DealershipService::new(state.store.as_ref())
        .mine(&principal)
        .await?;
    Ok(Json(DataResponse { data: mine }))
}

/// PUT /api/v1/dealerships/my-dealership
pub async fn update_my_dealership(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    AppJson(input): AppJson<DealershipUpdate>,
) -> AppResult<Json<DataResponse<Dealership>>> {
    let service = DealershipService::new(state.store.as_ref());
    let mine = service.mine(&principal).await?;
    let updated = service
        .update(&principal, mine.dealership.id, &input)
        .await?;
    Ok(Json(DataResponse { data: updated }))
}

/// PUT /api/v1/dealerships/{id}
pub async fn update_dealership(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<DealershipUpdate>,
) -> AppResult<Json<DataResponse<Dealership>>> {
    let updated = DealershipService::new(state.store.as_ref())
        .update(&principal, id, &input)
        .await?;
    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/dealerships/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<AddMemberRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Member>>)> {
    let member = DealershipService::new(state.store.as_ref())
        .add_member(&principal, id, input.account_id, input.role)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// DELETE /api/v1/dealerships/{id}/members/{account_id}
pub async fn remove_member(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path((id, account_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    DealershipService::new(state.store.as_ref())
        .remove_member(&principal, id, account_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/dealerships
pub async fn admin_list_dealerships(
    State(state): State<AppState>,
    RequireAdminAccess(_principal): RequireAdminAccess,
) -> AppResult<Json<DataResponse<Vec<DealershipSummary>>>> {
    let list = DealershipService::new(state.store.as_ref()).list().await?;
    Ok(Json(DataResponse { data: list }))
}

/// POST /api/v1/admin/dealerships
pub async fn create_dealership(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    AppJson(input): AppJson<CreateDealershipRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DealershipSummary>>)> {
    let created = DealershipService::new(state.store.as_ref())
        .create(&principal, &input.dealership, input.owner_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// DELETE /api/v1/admin/dealerships/{id}
pub async fn delete_dealership(
    State(state): State<AppState>,
    RequireAdminAccess(principal): RequireAdminAccess,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    DealershipService::new(state.store.as_ref())
        .delete(&principal, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
