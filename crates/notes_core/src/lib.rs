//! Core domain logic for the notes service.
//! This crate is the single source of truth for note ownership and slug rules.

pub mod auth;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod slug;

pub use form::{FormErrors, FormField, NoteForm, SLUG_TAKEN_WARNING};
pub use logging::{default_log_level, init_logging, LogTarget};
pub use model::note::{Note, NoteDraft, NoteId};
pub use model::user::{Principal, User, UserId};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::user_repo::{SqliteUserRepository, UserCredentials, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{check_password, prepare_account, AuthError, AuthService, NewAccount};
pub use service::note_service::{require_user, NoteService, NoteServiceError};
pub use slug::{slug_for_title, slugify, transliterate};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
