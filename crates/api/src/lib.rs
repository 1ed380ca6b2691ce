//! HTTP front end of the a4l vehicle catalog.
//!
//! The binary in `main.rs` wires these modules to PostgreSQL and SMTP; the
//! integration tests wire the same router to the in-memory store.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
