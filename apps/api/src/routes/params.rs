//! Request extractors and field helpers shared by the handlers.

use axum::extract::{FromRequest, FromRequestParts};
use uuid::Uuid;

use crate::errors::AppError;

/// `axum::Json` whose rejections use the `AppError` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` whose rejections use the `AppError` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Trimmed value when present and not blank.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses a UUID taken from a path, query or body field.
pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("{field} must be a valid UUID")))
}

/// `parse_uuid` for an optional field that must be present.
pub fn require_uuid(field: &str, raw: &Option<String>) -> Result<Uuid, AppError> {
    let raw = non_blank(raw).ok_or_else(|| AppError::Validation(format!("{field} is required")))?;
    parse_uuid(field, raw)
}
