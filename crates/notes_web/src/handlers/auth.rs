//! Login, logout and signup pages backed by cookie sessions.
//!
//! Argon2 work runs on the blocking pool with no connection held.

use crate::error::{WebError, LOGIN_PATH};
use crate::render;
use crate::state::{auth_service, AppState, SESSION_COOKIE};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use log::warn;
use notes_core::{check_password, prepare_account, AuthError};
use serde::Deserialize;
use tokio::task::{self, JoinError};

const DEFAULT_NEXT: &str = "/";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NextQuery {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SignupForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    password_confirm: String,
}

pub(crate) async fn login_form(Query(query): Query<NextQuery>) -> Response {
    render::login_page("", safe_next(query.next.as_deref()), None).into_response()
}

pub(crate) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let next = safe_next(form.next.as_deref());
    let credentials = state.with_conn(|conn| {
        Ok(auth_service(conn, state.session_ttl())?.find_credentials(&form.username)?)
    })?;

    let password = form.password.clone();
    let checked = task::spawn_blocking(move || check_password(credentials, &password))
        .await
        .map_err(blocking_failed)?;
    let user = match checked {
        Ok(user) => user,
        Err(err) if err.is_user_error() => {
            return Ok(
                render::login_page(&form.username, next, Some(&err.to_string())).into_response(),
            );
        }
        Err(err) => return Err(err.into()),
    };

    let session =
        state.with_conn(|conn| Ok(auth_service(conn, state.session_ttl())?.start_session(user)?))?;
    let cookie = Cookie::build((SESSION_COOKIE, session.token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    Ok((jar.add(cookie), render::found(next)).into_response())
}

pub(crate) async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let Some(token) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()) else {
        return Ok(render::logged_out_page().into_response());
    };
    state.with_conn(|conn| {
        auth_service(conn, state.session_ttl())?.log_out(&token)?;
        Ok(())
    })?;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, render::logged_out_page()).into_response())
}

pub(crate) async fn signup_form() -> Response {
    render::signup_page("", None).into_response()
}

pub(crate) async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, WebError> {
    let (username, password, password_confirm) = (
        form.username.clone(),
        form.password.clone(),
        form.password_confirm.clone(),
    );
    let prepared =
        task::spawn_blocking(move || prepare_account(&username, &password, &password_confirm))
            .await
            .map_err(blocking_failed)?;

    let registered = match prepared {
        Ok(account) => state
            .with_conn(|conn| Ok(auth_service(conn, state.session_ttl())?.register(&account)))?,
        Err(err) => Err(err),
    };
    match registered {
        Ok(_) => Ok(render::found(LOGIN_PATH)),
        Err(err) if err.is_user_error() => {
            warn!("event=signup module=web status=rejected reason={}", reason(&err));
            Ok(render::signup_page(&form.username, Some(&err.to_string())).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

fn blocking_failed(err: JoinError) -> WebError {
    WebError::Internal(format!("password task failed: {err}"))
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DEFAULT_NEXT,
    }
}

fn reason(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidUsername(_) => "invalid_username",
        AuthError::InvalidPassword(_) => "invalid_password",
        AuthError::PasswordMismatch => "password_mismatch",
        AuthError::UsernameTaken(_) => "username_taken",
        AuthError::InvalidCredentials => "invalid_credentials",
        AuthError::PasswordHash(_) | AuthError::Repo(_) => "server_error",
    }
}
