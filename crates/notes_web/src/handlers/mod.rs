//! Route handlers, grouped by surface.

pub(crate) mod auth;
pub(crate) mod notes;

use crate::render;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Path every successful note mutation redirects to.
pub(crate) const SUCCESS_PATH: &str = "/done/";

pub(crate) async fn fallback() -> Response {
    (StatusCode::NOT_FOUND, render::not_found_page()).into_response()
}
