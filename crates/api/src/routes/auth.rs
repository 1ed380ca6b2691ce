//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register     -> register
/// POST /verify-code  -> verify_code
/// POST /resend-code  -> resend_code
/// POST /login        -> login
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/verify-code", post(auth::verify_code))
        .route("/resend-code", post(auth::resend_code))
        .route("/login", post(auth::login))
}
