//! `Json` and `Query` wrappers whose rejections use the `AppError` envelope,
//! so a malformed body or query string answers with the same
//! `{error: {message, code}}` shape as every other failure.

use axum::extract::{FromRequest, FromRequestParts};

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(crate::error::AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(crate::error::AppError))]
pub struct AppQuery<T>(pub T);
