//! Row types for each table.
//!
//! Rows derive `FromRow` and convert into the `a4l_core` entities, which
//! carry no database dependency.

pub mod account;
pub mod brand;
pub mod dealership;
pub mod role;
pub mod setting;
pub mod vehicle;
