//! Request body extraction.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections render as the API's JSON error body
/// (`400 BAD_REQUEST`) instead of axum's plain-text responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
