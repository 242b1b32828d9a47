//! Request-level error type and its HTTP mapping.

use crate::render;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use log::error;
use notes_core::{AuthError, NoteServiceError, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const LOGIN_PATH: &str = "/auth/login/";

/// Outcome of a failed request.
#[derive(Debug)]
pub enum WebError {
    /// Anonymous access to a protected page; redirects to login.
    LoginRequired { next: String },
    NotFound,
    BadRequest(String),
    /// Server-side failure. The message is logged, never rendered.
    Internal(String),
}

impl WebError {
    /// Login redirect that returns to the requested path and query.
    pub fn login_required(uri: &Uri) -> Self {
        let next = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());
        Self::LoginRequired { next }
    }

    /// Maps a note service failure for the request at `uri`.
    pub fn from_note_error(err: NoteServiceError, uri: &Uri) -> Self {
        match err {
            NoteServiceError::AuthenticationRequired => Self::login_required(uri),
            NoteServiceError::NoteNotFound(_) => Self::NotFound,
            NoteServiceError::Invalid(errors) => Self::BadRequest(errors.to_string()),
            NoteServiceError::Repo(err) => err.into(),
        }
    }
}

impl Display for WebError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginRequired { next } => write!(f, "login required for `{next}`"),
            Self::NotFound => write!(f, "not found"),
            Self::BadRequest(details) => write!(f, "bad request: {details}"),
            Self::Internal(details) => write!(f, "internal error: {details}"),
        }
    }
}

impl Error for WebError {}

impl From<RepoError> for WebError {
    fn from(value: RepoError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<AuthError> for WebError {
    fn from(value: AuthError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::LoginRequired { next } => render::found(&login_url(&next)),
            Self::NotFound => (StatusCode::NOT_FOUND, render::not_found_page()).into_response(),
            Self::BadRequest(details) => {
                (StatusCode::BAD_REQUEST, render::bad_request_page(&details)).into_response()
            }
            Self::Internal(details) => {
                error!("event=request_failed module=web status=error details={details}");
                (StatusCode::INTERNAL_SERVER_ERROR, render::server_error_page()).into_response()
            }
        }
    }
}

/// `/auth/login/?next=<encoded path>`.
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}
