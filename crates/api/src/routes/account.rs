//! Route definitions for the signed-in account.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{account, confirm};
use crate::state::AppState;

/// Routes mounted at `/api/v1/account`.
///
/// ```text
/// GET    /          -> get_account
/// PUT    /          -> update_account
/// DELETE /          -> delete_account
/// PUT    /password  -> change_password
/// ```
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(account::get_account)
                .put(account::update_account)
                .delete(account::delete_account),
        )
        .route("/password", put(account::change_password))
}

/// Confirmation-link routes, mounted at the root (not under `/api/v1`) so
/// they match the links sent by email.
///
/// ```text
/// GET /account/confirm-email?token=     -> confirm_email
/// GET /account/confirm-password?token=  -> confirm_password
/// ```
pub fn confirm_router() -> Router<AppState> {
    Router::new()
        .route("/account/confirm-email", get(confirm::confirm_email))
        .route("/account/confirm-password", get(confirm::confirm_password))
}
