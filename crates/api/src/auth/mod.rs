//! Session tokens.
//!
//! - [`jwt`] -- HS256 access-token generation and validation.

pub mod jwt;
