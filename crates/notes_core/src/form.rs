//! Note form cleaning and per-field error collection.
//!
//! # Responsibility
//! - Normalize submitted title/text/slug values.
//! - Resolve the effective slug (explicit, or derived from the title).
//! - Collect field errors without touching storage.
//!
//! # Invariants
//! - Errors are grouped per field and kept in submission order.
//! - A form with any error never yields a [`NoteDraft`].
//!
//! Slug uniqueness needs storage and is checked by the note service through
//! [`CleanedForm::reject_taken_slug`].

use crate::model::note::{Note, NoteDraft, SLUG_MAX_CHARS, TITLE_MAX_CHARS};
use crate::slug::{is_valid_slug, slug_for_title};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Appended to a colliding slug to build the uniqueness error message.
pub const SLUG_TAKEN_WARNING: &str =
    " - такой slug уже существует, придумайте уникальное значение!";

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_SLUG_MESSAGE: &str =
    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.";
pub const UNSLUGGABLE_TITLE_MESSAGE: &str =
    "Could not build a slug from the title; enter one explicitly.";

/// Form fields that can carry errors, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Text,
    Slug,
}

impl FormField {
    /// Stable field name used in HTML forms.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Text => "text",
            Self::Slug => "slug",
        }
    }
}

/// Per-field validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<FormField, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: FormField, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Errors attached to one field; empty when the field is valid.
    pub fn field(&self, field: FormField) -> &[String] {
        self.fields.get(&field).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields with errors in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (*field, messages.as_slice()))
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                first = false;
                write!(f, "{}: {message}", field.as_str())?;
            }
        }
        Ok(())
    }
}

/// Raw submitted note form.
///
/// Missing fields deserialize as empty; fields not listed here (an `author`
/// value, for example) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl NoteForm {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        slug: Option<impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: slug.map(Into::into),
        }
    }

    /// Form pre-filled from an existing note, used by the edit page.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: Some(note.slug.clone()),
        }
    }

    /// Runs field-level validation and resolves the effective slug.
    pub fn clean(&self) -> CleanedForm {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        let title = if title.is_empty() {
            errors.add(FormField::Title, REQUIRED_MESSAGE);
            None
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.add(
                FormField::Title,
                max_length_message(TITLE_MAX_CHARS, title.chars().count()),
            );
            None
        } else {
            Some(title.to_string())
        };

        let text = self.text.trim();
        let text = if text.is_empty() {
            errors.add(FormField::Text, REQUIRED_MESSAGE);
            None
        } else {
            Some(text.to_string())
        };

        let explicit_slug = self
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let slug = match (explicit_slug, title.as_deref()) {
            (Some(slug), _) if slug.chars().count() > SLUG_MAX_CHARS => {
                errors.add(
                    FormField::Slug,
                    max_length_message(SLUG_MAX_CHARS, slug.chars().count()),
                );
                None
            }
            (Some(slug), _) if !is_valid_slug(slug) => {
                errors.add(FormField::Slug, INVALID_SLUG_MESSAGE);
                None
            }
            (Some(slug), _) => Some(slug.to_string()),
            (None, Some(title)) => {
                let generated = slug_for_title(title);
                if generated.is_empty() {
                    errors.add(FormField::Slug, UNSLUGGABLE_TITLE_MESSAGE);
                    None
                } else {
                    Some(generated)
                }
            }
            // The title error already explains why no slug could be derived.
            (None, None) => None,
        };

        CleanedForm {
            title,
            text,
            slug,
            errors,
        }
    }
}

/// Outcome of [`NoteForm::clean`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedForm {
    title: Option<String>,
    text: Option<String>,
    slug: Option<String>,
    errors: FormErrors,
}

impl CleanedForm {
    /// Resolved slug, present whenever it passed field-level checks.
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    /// Marks the resolved slug as already used by another note.
    pub fn reject_taken_slug(&mut self) {
        if let Some(slug) = self.slug.take() {
            self.errors
                .add(FormField::Slug, slug_taken_message(slug.as_str()));
        }
    }

    /// Converts into a write-ready draft, or returns every collected error.
    pub fn into_draft(self) -> Result<NoteDraft, FormErrors> {
        match (self.title, self.text, self.slug) {
            (Some(title), Some(text), Some(slug)) if self.errors.is_empty() => {
                Ok(NoteDraft { title, text, slug })
            }
            _ => Err(self.errors),
        }
    }
}

/// Error message for a slug that already belongs to another note.
pub fn slug_taken_message(slug: &str) -> String {
    format!("{slug}{SLUG_TAKEN_WARNING}")
}

fn max_length_message(limit: usize, actual: usize) -> String {
    format!("Ensure this value has at most {limit} characters (it has {actual}).")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_derives_slug_from_title_when_missing() {
        let cleaned = NoteForm::new("Заголовок", "Текст заметки", None::<String>).clean();
        assert_eq!(cleaned.slug(), Some("zagolovok"));
        let draft = cleaned.into_draft().unwrap();
        assert_eq!(draft.title, "Заголовок");
        assert_eq!(draft.slug, "zagolovok");
    }

    #[test]
    fn clean_treats_blank_slug_as_missing() {
        let cleaned = NoteForm::new("Заметка 1", "text", Some("   ")).clean();
        assert_eq!(cleaned.slug(), Some("zametka-1"));
    }

    #[test]
    fn clean_keeps_explicit_slug_verbatim() {
        let draft = NoteForm::new("Title", "body", Some(" New_Logic "))
            .clean()
            .into_draft()
            .unwrap();
        assert_eq!(draft.slug, "New_Logic");
    }

    #[test]
    fn clean_reports_required_fields() {
        let errors = NoteForm::default().clean().into_draft().unwrap_err();
        assert_eq!(errors.field(FormField::Title), [REQUIRED_MESSAGE]);
        assert_eq!(errors.field(FormField::Text), [REQUIRED_MESSAGE]);
        assert!(errors.field(FormField::Slug).is_empty());
    }

    #[test]
    fn clean_rejects_long_title_and_malformed_slug() {
        let form = NoteForm::new("x".repeat(101), "body", Some("not a slug"));
        let errors = form.clean().into_draft().unwrap_err();
        assert_eq!(
            errors.field(FormField::Title),
            ["Ensure this value has at most 100 characters (it has 101)."]
        );
        assert_eq!(errors.field(FormField::Slug), [INVALID_SLUG_MESSAGE]);
    }

    #[test]
    fn clean_rejects_title_without_sluggable_characters() {
        let errors = NoteForm::new("?!", "body", None::<String>)
            .clean()
            .into_draft()
            .unwrap_err();
        assert_eq!(errors.field(FormField::Slug), [UNSLUGGABLE_TITLE_MESSAGE]);
    }

    #[test]
    fn reject_taken_slug_uses_slug_plus_warning() {
        let mut cleaned = NoteForm::new("Title", "body", Some("note-slug")).clean();
        cleaned.reject_taken_slug();
        let errors = cleaned.into_draft().unwrap_err();
        assert_eq!(
            errors.field(FormField::Slug),
            [format!("note-slug{SLUG_TAKEN_WARNING}")]
        );
    }

    #[test]
    fn form_errors_display_lists_fields_in_order() {
        let mut errors = FormErrors::default();
        errors.add(FormField::Slug, "bad slug");
        errors.add(FormField::Title, "bad title");
        assert_eq!(errors.to_string(), "title: bad title; slug: bad slug");
    }
}
