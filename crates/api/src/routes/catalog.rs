//! Route definitions for the catalog.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes, merged directly into `/api/v1`.
///
/// ```text
/// GET    /brands          -> list_brands
/// POST   /brands          -> create_brand
/// GET    /brands/{id}     -> get_brand
/// PUT    /brands/{id}     -> update_brand
/// DELETE /brands/{id}     -> delete_brand
/// GET    /vehicles        -> list_vehicles
/// POST   /vehicles        -> create_vehicle
/// GET    /vehicles/{id}   -> get_vehicle
/// PUT    /vehicles/{id}   -> update_vehicle
/// DELETE /vehicles/{id}   -> delete_vehicle
/// POST   /import          -> import
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/brands",
            get(catalog::list_brands).post(catalog::create_brand),
        )
        .route(
            "/brands/{id}",
            get(catalog::get_brand)
                .put(catalog::update_brand)
                .delete(catalog::delete_brand),
        )
        .route(
            "/vehicles",
            get(catalog::list_vehicles).post(catalog::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(catalog::get_vehicle)
                .put(catalog::update_vehicle)
                .delete(catalog::delete_vehicle),
        )
        .route("/import", post(catalog::import))
}
