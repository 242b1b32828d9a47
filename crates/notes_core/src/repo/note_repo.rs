//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes and answer author-scoped lookups.
//! - Translate unique index failures on `notes.slug` into `SlugTaken`.
//!
//! # Invariants
//! - Author-scoped reads and deletes filter by `author_id` in SQL, so "no
//!   such slug" and "slug owned by someone else" are the same outcome.
//! - Author lists are ordered by `id ASC`.

use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::user::UserId;
use crate::repo::{ensure_tables, is_unique_violation, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    text,
    slug,
    author_id,
    created_at
FROM notes";

const SLUG_UNIQUE_COLUMN: &str = "notes.slug";

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts a note owned by `author` and returns the stored record.
    fn create_note(&self, author: UserId, draft: &NoteDraft) -> RepoResult<Note>;
    /// Replaces title/text/slug of a note owned by `author`.
    fn update_note(&self, id: NoteId, author: UserId, draft: &NoteDraft) -> RepoResult<Note>;
    /// Gets one note by id, regardless of owner.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Gets one note by slug only when it belongs to `author`.
    fn find_by_slug_for_author(&self, slug: &str, author: UserId) -> RepoResult<Option<Note>>;
    /// Lists every note owned by `author`.
    fn list_by_author(&self, author: UserId) -> RepoResult<Vec<Note>>;
    /// Deletes the note with `slug` only when it belongs to `author`.
    fn delete_by_slug_for_author(&self, slug: &str, author: UserId) -> RepoResult<()>;
    /// Returns whether any note other than `exclude` uses `slug`.
    fn slug_in_use(&self, slug: &str, exclude: Option<NoteId>) -> RepoResult<bool>;
    /// Total number of notes across all authors.
    fn count_notes(&self) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "notes"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, author: UserId, draft: &NoteDraft) -> RepoResult<Note> {
        self.conn
            .execute(
                "INSERT INTO notes (title, text, slug, author_id) VALUES (?1, ?2, ?3, ?4);",
                params![
                    draft.title.as_str(),
                    draft.text.as_str(),
                    draft.slug.as_str(),
                    author
                ],
            )
            .map_err(|err| map_slug_conflict(err, &draft.slug))?;

        let id = self.conn.last_insert_rowid();
        self.get_note(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("note {id} missing after insert")))
    }

    fn update_note(&self, id: NoteId, author: UserId, draft: &NoteDraft) -> RepoResult<Note> {
        let changed = self
            .conn
            .execute(
                "UPDATE notes
                 SET
                    title = ?1,
                    text = ?2,
                    slug = ?3
                 WHERE id = ?4
                   AND author_id = ?5;",
                params![
                    draft.title.as_str(),
                    draft.text.as_str(),
                    draft.slug.as_str(),
                    id,
                    author
                ],
            )
            .map_err(|err| map_slug_conflict(err, &draft.slug))?;

        if changed == 0 {
            return Err(RepoError::not_found("note", id));
        }

        self.get_note(id)?
            .ok_or_else(|| RepoError::not_found("note", id))
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }

    fn find_by_slug_for_author(&self, slug: &str, author: UserId) -> RepoResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE slug = ?1 AND author_id = ?2;"),
                params![slug, author],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }

    fn list_by_author(&self, author: UserId) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE author_id = ?1 ORDER BY id ASC;"))?;
        let notes = stmt
            .query_map([author], parse_note_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    fn delete_by_slug_for_author(&self, slug: &str, author: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE slug = ?1 AND author_id = ?2;",
            params![slug, author],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("note", slug));
        }

        Ok(())
    }

    fn slug_in_use(&self, slug: &str, exclude: Option<NoteId>) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM notes
                WHERE slug = ?1
                  AND (?2 IS NULL OR id != ?2)
            );",
            params![slug, exclude],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count_notes(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{count}`")))
    }
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        text: row.get("text")?,
        slug: row.get("slug")?,
        author: row.get("author_id")?,
        created_at: row.get("created_at")?,
    })
}

fn map_slug_conflict(err: rusqlite::Error, slug: &str) -> RepoError {
    if is_unique_violation(&err, SLUG_UNIQUE_COLUMN) {
        RepoError::SlugTaken(slug.to_string())
    } else {
        err.into()
    }
}
