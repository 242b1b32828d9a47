//! Shared request state.

use crate::error::WebError;
use axum_extra::extract::cookie::CookieJar;
use notes_core::{
    AuthService, NoteService, Principal, SqliteNoteRepository, SqliteUserRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "notes_session";

/// Router state: one migrated SQLite connection plus auth settings.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    session_ttl: Duration,
}

impl AppState {
    /// Wraps a connection already opened through `notes_core::db`.
    pub fn new(conn: Connection, session_ttl: Duration) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            session_ttl,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Runs `op` while holding the connection lock.
    pub fn with_conn<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, WebError>,
    ) -> Result<T, WebError> {
        let conn = self
            .db
            .lock()
            .map_err(|_| WebError::Internal("database lock poisoned".to_string()))?;
        op(&conn)
    }
}

pub(crate) fn note_service(
    conn: &Connection,
) -> Result<NoteService<SqliteNoteRepository<'_>>, WebError> {
    Ok(NoteService::new(SqliteNoteRepository::try_new(conn)?))
}

pub(crate) fn auth_service(
    conn: &Connection,
    session_ttl: Duration,
) -> Result<AuthService<SqliteUserRepository<'_>>, WebError> {
    Ok(AuthService::new(SqliteUserRepository::try_new(conn)?).with_session_ttl(session_ttl))
}

/// Resolves the session cookie, if any, into the requesting principal.
pub(crate) fn resolve_principal(
    conn: &Connection,
    jar: &CookieJar,
) -> Result<Principal, WebError> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());
    Ok(AuthService::new(SqliteUserRepository::try_new(conn)?).authenticate(token)?)
}
