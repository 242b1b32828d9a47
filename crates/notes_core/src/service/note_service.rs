//! Note use-case service with owner-based access control.
//!
//! # Responsibility
//! - Provide list/create/detail/edit/delete use-cases for one principal.
//! - Run form validation, including slug uniqueness, before any write.
//!
//! # Invariants
//! - Anonymous principals are rejected before storage is touched.
//! - Detail, edit and delete only ever see notes authored by the principal;
//!   anything else is reported as `NoteNotFound`, never as forbidden.
//! - The author of a created note is always the principal.
//! - Invalid submissions never write.

use crate::form::{slug_taken_message, FormErrors, FormField, NoteForm};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::user::{Principal, User};
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// The principal is anonymous.
    AuthenticationRequired,
    /// No note with this slug belongs to the principal.
    NoteNotFound(String),
    /// Submitted form failed validation.
    Invalid(FormErrors),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationRequired => write!(f, "authentication required"),
            Self::NoteNotFound(slug) => write!(f, "note not found: {slug}"),
            Self::Invalid(errors) => write!(f, "invalid note form: {errors}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::SlugTaken(slug) => {
                let mut errors = FormErrors::default();
                errors.add(FormField::Slug, slug_taken_message(&slug));
                Self::Invalid(errors)
            }
            other => Self::Repo(other),
        }
    }
}

/// Returns the authenticated user or `AuthenticationRequired`.
pub fn require_user(principal: &Principal) -> Result<&User, NoteServiceError> {
    principal
        .user()
        .ok_or(NoteServiceError::AuthenticationRequired)
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the principal's own notes, oldest first.
    pub fn list_notes(&self, principal: &Principal) -> Result<Vec<Note>, NoteServiceError> {
        let user = require_user(principal)?;
        Ok(self.repo.list_by_author(user.id)?)
    }

    /// Validates `form` and stores a new note authored by the principal.
    pub fn create_note(
        &self,
        principal: &Principal,
        form: &NoteForm,
    ) -> Result<Note, NoteServiceError> {
        let user = require_user(principal)?;
        let draft = self.validate(form, None)?;
        let note = self.repo.create_note(user.id, &draft)?;
        info!(
            "event=note_create module=note_service status=ok note_id={} author_id={}",
            note.id, user.id
        );
        Ok(note)
    }

    /// Gets one of the principal's notes by slug.
    pub fn note_detail(&self, principal: &Principal, slug: &str) -> Result<Note, NoteServiceError> {
        let user = require_user(principal)?;
        self.owned_note(user, slug)
    }

    /// Form pre-filled with the current values of one of the principal's notes.
    pub fn edit_form(&self, principal: &Principal, slug: &str) -> Result<NoteForm, NoteServiceError> {
        let user = require_user(principal)?;
        let note = self.owned_note(user, slug)?;
        Ok(NoteForm::from_note(&note))
    }

    /// Replaces title/text/slug of one of the principal's notes.
    ///
    /// A blank slug is derived again from the submitted title.
    pub fn edit_note(
        &self,
        principal: &Principal,
        slug: &str,
        form: &NoteForm,
    ) -> Result<Note, NoteServiceError> {
        let user = require_user(principal)?;
        let current = self.owned_note(user, slug)?;
        let draft = self.validate(form, Some(current.id))?;
        let note = self
            .repo
            .update_note(current.id, user.id, &draft)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => NoteServiceError::NoteNotFound(slug.to_string()),
                other => other.into(),
            })?;
        info!(
            "event=note_update module=note_service status=ok note_id={} author_id={}",
            note.id, user.id
        );
        Ok(note)
    }

    /// Deletes one of the principal's notes.
    pub fn delete_note(&self, principal: &Principal, slug: &str) -> Result<(), NoteServiceError> {
        let user = require_user(principal)?;
        match self.repo.delete_by_slug_for_author(slug, user.id) {
            Ok(()) => {
                info!(
                    "event=note_delete module=note_service status=ok author_id={}",
                    user.id
                );
                Ok(())
            }
            Err(RepoError::NotFound { .. }) => {
                warn!(
                    "event=note_delete module=note_service status=not_found author_id={}",
                    user.id
                );
                Err(NoteServiceError::NoteNotFound(slug.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn owned_note(&self, user: &User, slug: &str) -> Result<Note, NoteServiceError> {
        self.repo
            .find_by_slug_for_author(slug, user.id)?
            .ok_or_else(|| {
                warn!(
                    "event=note_lookup module=note_service status=not_found author_id={}",
                    user.id
                );
                NoteServiceError::NoteNotFound(slug.to_string())
            })
    }

    fn validate(&self, form: &NoteForm, exclude: Option<NoteId>) -> Result<NoteDraft, NoteServiceError> {
        let mut cleaned = form.clean();
        let taken = match cleaned.slug() {
            Some(slug) => self.repo.slug_in_use(slug, exclude)?,
            None => false,
        };
        if taken {
            cleaned.reject_taken_slug();
        }
        cleaned.into_draft().map_err(NoteServiceError::Invalid)
    }
}
