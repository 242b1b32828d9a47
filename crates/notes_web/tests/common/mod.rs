#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use notes_core::db::open_db_in_memory;
use notes_core::{
    Note, NoteForm, NoteRepository, NoteService, Principal, SqliteNoteRepository,
    SqliteUserRepository, User, UserRepository,
};
use notes_web::{build_router, AppState, SESSION_COOKIE};
use std::time::Duration;
use tower::ServiceExt;

const FAR_FUTURE_MS: i64 = i64::MAX / 2;

pub fn app() -> AppState {
    AppState::new(open_db_in_memory().unwrap(), Duration::from_secs(3600))
}

/// Creates a user with a live session and returns it with the session token.
pub fn logged_in_user(state: &AppState, username: &str) -> (User, String) {
    state
        .with_conn(|conn| {
            let repo = SqliteUserRepository::try_new(conn)?;
            let user = repo.create_user(username, "$argon2id$placeholder")?;
            let token = format!("token-{}", user.id);
            repo.create_session(&token, user.id, FAR_FUTURE_MS)?;
            Ok((user, token))
        })
        .unwrap()
}

pub fn create_note(state: &AppState, author: &User, title: &str, text: &str, slug: Option<&str>) -> Note {
    let principal = Principal::Authenticated(author.clone());
    state
        .with_conn(|conn| {
            let service = NoteService::new(SqliteNoteRepository::try_new(conn)?);
            Ok(service
                .create_note(&principal, &NoteForm::new(title, text, slug))
                .unwrap())
        })
        .unwrap()
}

pub fn note_count(state: &AppState) -> u64 {
    state
        .with_conn(|conn| Ok(SqliteNoteRepository::try_new(conn)?.count_notes()?))
        .unwrap()
}

pub fn find_note(state: &AppState, author: &User, slug: &str) -> Option<Note> {
    state
        .with_conn(|conn| Ok(SqliteNoteRepository::try_new(conn)?.find_by_slug_for_author(slug, author.id)?))
        .unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    with_session(Request::builder().method("GET").uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    with_session(Request::builder().method("DELETE").uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, token: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    with_session(Request::builder().method("POST").uri(uri), token)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_body(fields)))
        .unwrap()
}

/// `POST` with no body and no content type.
pub fn post_empty(uri: &str, token: Option<&str>) -> Request<Body> {
    with_session(Request::builder().method("POST").uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

fn with_session(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}")),
        None => builder,
    }
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
    build_router(state.clone()).oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
