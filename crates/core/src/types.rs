//! Primitive aliases shared by the a4l crates.

/// Row identifier: `BIGSERIAL` in PostgreSQL, a counter in the memory store.
pub type DbId = i64;

/// A UTC instant. Expiries, `created_at` and `updated_at` all use it.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
