//! Repository layer: one zero-sized struct per table, static async methods
//! taking `&PgPool`.

pub mod account_repo;
pub mod brand_repo;
pub mod dealership_repo;
pub mod role_repo;
pub mod settings_repo;
pub mod vehicle_repo;

pub use account_repo::AccountRepo;
pub use brand_repo::BrandRepo;
pub use dealership_repo::{DealershipRepo, MemberRepo};
pub use role_repo::RoleRepo;
pub use settings_repo::SettingsRepo;
pub use vehicle_repo::VehicleRepo;
