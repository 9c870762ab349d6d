//! Request extractors with JSON rejections.

use axum::extract::{FromRequestParts, Path};

use crate::api::error::ApiError;

/// [`Path`] whose rejection is an [`ApiError`], so malformed placeholders get
/// the same JSON body as failed validation.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
