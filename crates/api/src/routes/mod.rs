pub mod account;
pub mod admin;
pub mod auth;
pub mod catalog;
pub mod dealerships;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                      register (public)
/// /auth/verify-code                   verify email code (public)
/// /auth/resend-code                   issue a new code (public)
/// /auth/login                         login (public)
///
/// /account                            get, update, delete (auth required)
/// /account/password                   stage a password change (auth required)
///
/// /admin/users                        list (access_admin + manage_users)
/// /admin/users/{id}                   delete
/// /admin/users/{id}/role              assign or detach role (PUT)
/// /admin/users/{id}/email             stage email change (PUT)
/// /admin/users/{id}/password          stage password reset (PUT)
/// /admin/roles                        list, create (access_admin + manage_roles)
/// /admin/roles/{id}                   get, update, delete
/// /admin/dealerships                  list, create with owner (manage_dealerships)
/// /admin/dealerships/{id}             delete
/// /admin/settings                     get, update (manage_site)
///
/// /brands                             list (public), create (edit_brands)
/// /brands/{id}                        get (public), update, delete
/// /vehicles                           list (public, ?brand_id=), create (edit_vehicles)
/// /vehicles/{id}                      get (public), update, delete
/// /import                             bulk JSON import (import)
///
/// /directory                          in-game dealership directory (public)
/// /site-settings                      logo and favicon (public)
/// /dealerships                        list (public)
/// /dealerships/my-dealership          get, update (owner or manager)
/// /dealerships/{id}                   get (public), update (owner or manager)
/// /dealerships/{id}/members           add (owner)
/// /dealerships/{id}/members/{account} remove (owner, or manager for employees)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/account", account::api_router())
        .nest("/admin", admin::router())
        .merge(catalog::router())
        .merge(dealerships::router())
}
