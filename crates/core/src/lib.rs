//! A4L vehicle catalog domain core.
//!
//! Everything in this crate is free of HTTP and SQL. Persistence and
//! notification delivery are reached through the [`store`] and [`notify`]
//! traits so the same logic runs against PostgreSQL in production and an
//! in-memory store in tests.
//!
//! - [`capability`] / [`roles`] -- capability flags and role definitions.
//! - [`principal`] -- principal construction and credential resolution.
//! - [`authorization`] -- the capability guard and membership checks.
//! - [`pending`] -- the pending-change ledger (email/password slots).
//! - [`workflow`] -- the confirmation workflow around the ledger.
//! - [`verification`] -- registration codes with capped attempts.
//! - [`dealership`] -- player-run dealerships and their members.

pub mod account;
pub mod accounts;
pub mod authorization;
pub mod capability;
pub mod catalog;
pub mod dealership;
pub mod directory;
pub mod error;
pub mod notify;
pub mod password;
pub mod pending;
pub mod principal;
pub mod registry;
pub mod roles;
pub mod site;
pub mod store;
pub mod theme;
pub mod tokens;
pub mod types;
pub mod verification;
pub mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
