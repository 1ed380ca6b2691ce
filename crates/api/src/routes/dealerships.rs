//! Route definitions for dealerships, the in-game directory and public
//! site settings.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{dealerships, site};
use crate::state::AppState;

/// Routes merged directly into `/api/v1`.
///
/// ```text
/// GET    /directory                               -> directory
/// GET    /site-settings                           -> public_settings
/// GET    /dealerships                             -> list_dealerships
/// GET    /dealerships/my-dealership               -> my_dealership
/// PUT    /dealerships/my-dealership               -> update_my_dealership
/// GET    /dealerships/{id}                        -> get_dealership
/// PUT    /dealerships/{id}                        -> update_dealership
/// POST   /dealerships/{id}/members                -> add_member
/// DELETE /dealerships/{id}/members/{account_id}   -> remove_member
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/directory", get(dealerships::directory))
        .route("/site-settings", get(site::public_settings))
        .route("/dealerships", get(dealerships::list_dealerships))
        .route(
            "/dealerships/my-dealership",
            get(dealerships::my_dealership).put(dealerships::update_my_dealership),
        )
        .route(
            "/dealerships/{id}",
            get(dealerships::get_dealership).put(dealerships::update_dealership),
        )
        .route("/dealerships/{id}/members", post(dealerships::add_member))
        .route(
            "/dealerships/{id}/members/{account_id}",
            delete(dealerships::remove_member),
        )
}
