pub mod account;
pub mod admin;
pub mod auth;
pub mod catalog;
pub mod confirm;
pub mod dealerships;
pub mod roles;
pub mod site;
