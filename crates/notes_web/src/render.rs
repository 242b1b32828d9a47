//! Server-side HTML rendering.
//!
//! Every interpolated value goes through [`escape`]. Pages are plain strings
//! wrapped in [`Html`]; there is no template engine.

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use notes_core::{FormErrors, FormField, Note, NoteForm, Principal};
use std::fmt::Write as _;

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Escapes text for HTML element content and quoted attribute values.
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn layout(title: &str, principal: &Principal, body: &str) -> Html<String> {
    let nav = match principal.user() {
        Some(user) => format!(
            r#"<a href="/notes/">Notes</a> <a href="/add/">Add note</a>
<span class="user">{}</span>
<form method="post" action="/auth/logout/" class="inline"><button type="submit">Log out</button></form>"#,
            escape(&user.username)
        ),
        None => r#"<a href="/auth/login/">Log in</a> <a href="/auth/signup/">Sign up</a>"#
            .to_string(),
    };
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<header><a href="/">Home</a> {nav}</header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    ))
}

pub(crate) fn home_page(principal: &Principal) -> Html<String> {
    let body = if principal.is_authenticated() {
        r#"<h1>Notes</h1><p>Keep short notes for yourself. <a href="/notes/">Your notes</a>.</p>"#
    } else {
        r#"<h1>Notes</h1><p>Log in to keep short notes for yourself.</p>"#
    };
    layout("Notes", principal, body)
}

pub(crate) fn note_list_page(principal: &Principal, notes: &[Note]) -> Html<String> {
    let mut body = String::from("<h1>Your notes</h1>\n");
    if notes.is_empty() {
        body.push_str("<p>No notes yet.</p>\n");
    } else {
        body.push_str("<ul class=\"notes\">\n");
        for note in notes {
            let _ = writeln!(
                body,
                r#"<li><a href="/note/{slug}/">{title}</a></li>"#,
                slug = urlencoding::encode(&note.slug),
                title = escape(&note.title),
            );
        }
        body.push_str("</ul>\n");
    }
    layout("Your notes", principal, &body)
}

pub(crate) fn note_detail_page(principal: &Principal, note: &Note) -> Html<String> {
    let slug = urlencoding::encode(&note.slug);
    let body = format!(
        r#"<article>
<h1>{title}</h1>
<p class="slug">{slug_text}</p>
<div class="text">{text}</div>
</article>
<p><a href="/edit/{slug}/">Edit</a> <a href="/delete/{slug}/">Delete</a></p>"#,
        title = escape(&note.title),
        slug_text = escape(&note.slug),
        text = escape(&note.text),
    );
    layout(&note.title, principal, &body)
}

/// Which form page is being rendered.
pub(crate) enum FormMode<'a> {
    Create,
    Edit { slug: &'a str },
}

pub(crate) fn note_form_page(
    principal: &Principal,
    mode: FormMode<'_>,
    form: &NoteForm,
    errors: &FormErrors,
) -> Html<String> {
    let (heading, action) = match mode {
        FormMode::Create => ("Add note".to_string(), "/add/".to_string()),
        FormMode::Edit { slug } => (
            "Edit note".to_string(),
            format!("/edit/{}/", urlencoding::encode(slug)),
        ),
    };
    let body = format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}" class="note-form">
<p><label for="id_title">Title</label>
<input type="text" name="title" id="id_title" maxlength="100" value="{title}"></p>
{title_errors}
<p><label for="id_text">Text</label>
<textarea name="text" id="id_text">{text}</textarea></p>
{text_errors}
<p><label for="id_slug">Slug</label>
<input type="text" name="slug" id="id_slug" maxlength="100" value="{slug}">
<small>Leave empty to build it from the title.</small></p>
{slug_errors}
<button type="submit">Save</button>
</form>"#,
        action = escape(&action),
        title = escape(&form.title),
        text = escape(&form.text),
        slug = escape(form.slug.as_deref().unwrap_or_default()),
        title_errors = error_list(errors, FormField::Title),
        text_errors = error_list(errors, FormField::Text),
        slug_errors = error_list(errors, FormField::Slug),
    );
    layout(&heading, principal, &body)
}

fn error_list(errors: &FormErrors, field: FormField) -> String {
    let messages = errors.field(field);
    if messages.is_empty() {
        return String::new();
    }
    let mut list = format!(r#"<ul class="errorlist" id="{}_errors">"#, field.as_str());
    for message in messages {
        let _ = write!(list, "<li>{}</li>", escape(message));
    }
    list.push_str("</ul>");
    list
}

pub(crate) fn delete_confirm_page(principal: &Principal, note: &Note) -> Html<String> {
    let body = format!(
        r#"<h1>Delete note</h1>
<p>Delete <strong>{title}</strong>?</p>
<form method="post" action="/delete/{slug}/"><button type="submit">Delete</button></form>"#,
        title = escape(&note.title),
        slug = urlencoding::encode(&note.slug),
    );
    layout("Delete note", principal, &body)
}

pub(crate) fn success_page(principal: &Principal) -> Html<String> {
    layout(
        "Done",
        principal,
        r#"<h1>Done</h1><p>Your changes were saved. <a href="/notes/">Back to notes</a>.</p>"#,
    )
}

pub(crate) fn login_page(username: &str, next: &str, error: Option<&str>) -> Html<String> {
    let error = error
        .map(|message| format!(r#"<p class="errornote">{}</p>"#, escape(message)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Log in</h1>
{error}
<form method="post" action="/auth/login/">
<p><label for="id_username">Username</label>
<input type="text" name="username" id="id_username" value="{username}"></p>
<p><label for="id_password">Password</label>
<input type="password" name="password" id="id_password"></p>
<input type="hidden" name="next" value="{next}">
<button type="submit">Log in</button>
</form>"#,
        username = escape(username),
        next = escape(next),
    );
    layout("Log in", &Principal::Anonymous, &body)
}

pub(crate) fn signup_page(username: &str, error: Option<&str>) -> Html<String> {
    let error = error
        .map(|message| format!(r#"<p class="errornote">{}</p>"#, escape(message)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Sign up</h1>
{error}
<form method="post" action="/auth/signup/">
<p><label for="id_username">Username</label>
<input type="text" name="username" id="id_username" maxlength="150" value="{username}"></p>
<p><label for="id_password">Password</label>
<input type="password" name="password" id="id_password"></p>
<p><label for="id_password_confirm">Password confirmation</label>
<input type="password" name="password_confirm" id="id_password_confirm"></p>
<button type="submit">Sign up</button>
</form>"#,
        username = escape(username),
    );
    layout("Sign up", &Principal::Anonymous, &body)
}

pub(crate) fn logged_out_page() -> Html<String> {
    layout(
        "Logged out",
        &Principal::Anonymous,
        r#"<h1>Logged out</h1><p><a href="/auth/login/">Log in again</a></p>"#,
    )
}

pub(crate) fn not_found_page() -> Html<String> {
    layout("Not found", &Principal::Anonymous, "<h1>Not found</h1>")
}

pub(crate) fn bad_request_page(details: &str) -> Html<String> {
    layout(
        "Bad request",
        &Principal::Anonymous,
        &format!("<h1>Bad request</h1><p>{}</p>", escape(details)),
    )
}

pub(crate) fn server_error_page() -> Html<String> {
    layout(
        "Server error",
        &Principal::Anonymous,
        "<h1>Server error</h1><p>Something went wrong. Try again later.</p>",
    )
}
