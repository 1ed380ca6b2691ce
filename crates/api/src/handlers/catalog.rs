//! Handlers for the vehicle catalog (`/brands`, `/vehicles`, `/import`).
//!
//! Reads are public. Mutations take an [`AuthPrincipal`] and the catalog
//! service checks the matching capability.

use a4l_core::catalog::{
    Brand, BrandDetail, BrandInput, BrandSummary, CatalogService, ImportReport, Vehicle,
    VehicleInput,
};
use a4l_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthPrincipal;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /vehicles`.
#[derive(Debug, Deserialize)]
pub struct VehicleFilter {
    pub brand_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Brands
// ---------------------------------------------------------------------------

/// GET /api/v1/brands
pub async fn list_brands(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<BrandSummary>>>> {
    let brands = CatalogService::new(state.store.as_ref()).list_brands().await?;
    Ok(Json(DataResponse { data: brands }))
}

/// GET /api/v1/brands/{id}
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BrandDetail>>> {
    let brand = CatalogService::new(state.store.as_ref()).brand(id).await?;
    Ok(Json(DataResponse { data: brand }))
}

/// POST /api/v1/brands
pub async fn create_brand(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    AppJson(input): AppJson<BrandInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Brand>>)> {
    let brand = CatalogService::new(state.store.as_ref())
        .create_brand(&principal, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: brand })))
}

/// PUT /api/v1/brands/{id}
pub async fn update_brand(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<BrandInput>,
) -> AppResult<Json<DataResponse<Brand>>> {
    let brand = CatalogService::new(state.store.as_ref())
        .update_brand(&principal, id, &input)
        .await?;
    Ok(Json(DataResponse { data: brand }))
}

/// DELETE /api/v1/brands/{id}
///
/// Removes the brand's vehicles too.
pub async fn delete_brand(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CatalogService::new(state.store.as_ref())
        .delete_brand(&principal, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

/// GET /api/v1/vehicles?brand_id=
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(filter): Query<VehicleFilter>,
) -> AppResult<Json<DataResponse<Vec<Vehicle>>>> {
    let vehicles = CatalogService::new(state.store.as_ref())
        .list_vehicles(filter.brand_id)
        .await?;
    Ok(Json(DataResponse { data: vehicles }))
}

/// GET /api/v1/vehicles/{id}
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vehicle>>> {
    let vehicle = CatalogService::new(state.store.as_ref()).vehicle(id).await?;
    Ok(Json(DataResponse { data: vehicle }))
}

/// POST /api/v1/vehicles
pub async fn create_vehicle(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    AppJson(input): AppJson<VehicleInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Vehicle>>)> {
    let vehicle = CatalogService::new(state.store.as_ref())
        .create_vehicle(&principal, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: vehicle })))
}

/// PUT /api/v1/vehicles/{id}
pub async fn update_vehicle(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<VehicleInput>,
) -> AppResult<Json<DataResponse<Vehicle>>> {
    let vehicle = CatalogService::new(state.store.as_ref())
        .update_vehicle(&principal, id, &input)
        .await?;
    Ok(Json(DataResponse { data: vehicle }))
}

/// DELETE /api/v1/vehicles/{id}
pub async fn delete_vehicle(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CatalogService::new(state.store.as_ref())
        .delete_vehicle(&principal, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// POST /api/v1/import
///
/// Bulk-create vehicles from `{ "vehicles": [...] }`. Rejected entries are
/// counted, not fatal.
pub async fn import(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    AppJson(payload): AppJson<Value>,
) -> AppResult<Json<DataResponse<ImportReport>>> {
    let report = CatalogService::new(state.store.as_ref())
        .import(&principal, &payload)
        .await?;
    Ok(Json(DataResponse { data: report }))
}
