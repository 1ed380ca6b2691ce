//! Route definitions for `/admin`.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::{admin, dealerships, roles, site};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /users                 -> list_users
/// DELETE /users/{id}            -> delete_user
/// PUT    /users/{id}/role       -> assign_role
/// PUT    /users/{id}/email      -> change_email
/// PUT    /users/{id}/password   -> reset_password
/// GET    /roles                 -> list_roles
/// POST   /roles                 -> create_role
/// GET    /roles/{id}            -> get_role
/// PUT    /roles/{id}            -> update_role
/// DELETE /roles/{id}            -> delete_role
/// GET    /dealerships           -> admin_list_dealerships
/// POST   /dealerships           -> create_dealership
/// DELETE /dealerships/{id}      -> delete_dealership
/// GET    /settings              -> admin_settings
/// PUT    /settings              -> update_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/role", put(admin::assign_role))
        .route("/users/{id}/email", put(admin::change_email))
        .route("/users/{id}/password", put(admin::reset_password))
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route(
            "/dealerships",
            get(dealerships::admin_list_dealerships).post(dealerships::create_dealership),
        )
        .route("/dealerships/{id}", delete(dealerships::delete_dealership))
        .route(
            "/settings",
            get(site::admin_settings).put(site::update_settings),
        )
}
