//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its write-side drafts.
//! - Own the length limits shared by forms, slugs and storage.
//!
//! # Invariants
//! - `id`, `author` and `created_at` never change after creation.
//! - `slug` only changes through an explicit edit by the author.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Surrogate key assigned by storage.
pub type NoteId = i64;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum slug length in characters.
pub const SLUG_MAX_CHARS: usize = 100;

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub text: String,
    pub slug: String,
    /// Owning user. The only principal allowed to see or change this note.
    pub author: UserId,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
}

/// Validated field values ready to be written.
///
/// Produced by [`crate::form::NoteForm::clean`]; the author is supplied
/// separately by the service from the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub slug: String,
}
