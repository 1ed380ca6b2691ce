//! The JSON envelope returned by successful API calls.

use serde::Serialize;

/// Wraps a payload as `{ "data": ... }`.
///
/// Login is the one endpoint that answers without it, returning the token
/// fields at the top level.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
