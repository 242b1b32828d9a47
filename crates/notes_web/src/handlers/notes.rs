//! Note pages: list, add, detail, edit, delete, success.
//!
//! Each handler resolves the principal and runs exactly one service call
//! under a single connection lock. Form bodies are read only after the
//! principal (and, for edits, ownership) has been checked.

use super::SUCCESS_PATH;
use crate::error::WebError;
use crate::render::{self, FormMode};
use crate::state::{note_service, resolve_principal, AppState};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use notes_core::{require_user, FormErrors, NoteForm, NoteServiceError};

pub(crate) async fn home(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        Ok(render::home_page(&principal).into_response())
    })
}

pub(crate) async fn list(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        let notes = note_service(conn)?
            .list_notes(&principal)
            .map_err(|err| WebError::from_note_error(err, &uri))?;
        Ok(render::note_list_page(&principal, &notes).into_response())
    })
}

pub(crate) async fn add_form(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        if !principal.is_authenticated() {
            return Err(WebError::login_required(&uri));
        }
        Ok(render::note_form_page(
            &principal,
            FormMode::Create,
            &NoteForm::default(),
            &FormErrors::default(),
        )
        .into_response())
    })
}

pub(crate) async fn add(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    form: Result<Form<NoteForm>, FormRejection>,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        let form = match form {
            Ok(Form(form)) => form,
            Err(rejection) => {
                require_user(&principal).map_err(|err| WebError::from_note_error(err, &uri))?;
                return Ok(rejection.into_response());
            }
        };
        match note_service(conn)?.create_note(&principal, &form) {
            Ok(_) => Ok(render::found(SUCCESS_PATH)),
            Err(NoteServiceError::Invalid(errors)) => {
                Ok(render::note_form_page(&principal, FormMode::Create, &form, &errors)
                    .into_response())
            }
            Err(err) => Err(WebError::from_note_error(err, &uri)),
        }
    })
}

pub(crate) async fn detail(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        let note = note_service(conn)?
            .note_detail(&principal, &slug)
            .map_err(|err| WebError::from_note_error(err, &uri))?;
        Ok(render::note_detail_page(&principal, &note).into_response())
    })
}

pub(crate) async fn edit_form(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        let form = note_service(conn)?
            .edit_form(&principal, &slug)
            .map_err(|err| WebError::from_note_error(err, &uri))?;
        Ok(render::note_form_page(
            &principal,
            FormMode::Edit { slug: &slug },
            &form,
            &FormErrors::default(),
        )
        .into_response())
    })
}

pub(crate) async fn edit(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    Path(slug): Path<String>,
    form: Result<Form<NoteForm>, FormRejection>,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        let notes = note_service(conn)?;
        let form = match form {
            Ok(Form(form)) => form,
            Err(rejection) => {
                notes
                    .note_detail(&principal, &slug)
                    .map_err(|err| WebError::from_note_error(err, &uri))?;
                return Ok(rejection.into_response());
            }
        };
        match notes.edit_note(&principal, &slug, &form) {
            Ok(_) => Ok(render::found(SUCCESS_PATH)),
            Err(NoteServiceError::Invalid(errors)) => Ok(render::note_form_page(
                &principal,
                FormMode::Edit { slug: &slug },
                &form,
                &errors,
            )
            .into_response()),
            Err(err) => Err(WebError::from_note_error(err, &uri)),
        }
    })
}

pub(crate) async fn delete_confirm(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        let note = note_service(conn)?
            .note_detail(&principal, &slug)
            .map_err(|err| WebError::from_note_error(err, &uri))?;
        Ok(render::delete_confirm_page(&principal, &note).into_response())
    })
}

/// Handles both `POST` and `DELETE`.
pub(crate) async fn delete(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        note_service(conn)?
            .delete_note(&principal, &slug)
            .map_err(|err| WebError::from_note_error(err, &uri))?;
        Ok(render::found(SUCCESS_PATH))
    })
}

pub(crate) async fn success(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Response, WebError> {
    state.with_conn(|conn| {
        let principal = resolve_principal(conn, &jar)?;
        if !principal.is_authenticated() {
            return Err(WebError::login_required(&uri));
        }
        Ok(render::success_page(&principal).into_response())
    })
}
