//! Authentication and authorization extractors.
//!
//! - [`auth::AuthPrincipal`] -- Resolves the caller's principal from a JWT Bearer token.
//! - [`rbac::RequireAdminAccess`] -- Requires the `access_admin` capability.

pub mod auth;
pub mod rbac;
