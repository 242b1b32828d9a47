//! User and session repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist accounts with their password hashes.
//! - Persist login sessions and resolve session tokens into users.
//!
//! # Invariants
//! - Password hashes are only returned through [`UserCredentials`].
//! - Expired sessions never resolve to a user.

use crate::model::user::{User, UserId};
use crate::repo::{ensure_tables, is_unique_violation, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Account row including the stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Repository interface for users and their sessions.
pub trait UserRepository {
    fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>>;
    fn create_session(&self, token: &str, user: UserId, expires_at: i64) -> RepoResult<()>;
    /// Resolves a session token that has not expired at `now_ms`.
    fn find_session_user(&self, token: &str, now_ms: i64) -> RepoResult<Option<User>>;
    /// Removes one session. Missing tokens are not an error.
    fn delete_session(&self, token: &str) -> RepoResult<()>;
    /// Removes sessions expired at `now_ms` and returns how many were removed.
    fn purge_expired_sessions(&self, now_ms: i64) -> RepoResult<usize>;
}

/// SQLite-backed user/session repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "sessions"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User> {
        self.conn
            .execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2);",
                params![username, password_hash],
            )
            .map_err(|err| {
                if is_unique_violation(&err, "users.username") {
                    RepoError::UsernameTaken(username.to_string())
                } else {
                    err.into()
                }
            })?;

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("user {id} missing after insert")))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, created_at FROM users WHERE id = ?1;",
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>> {
        let credentials = self
            .conn
            .query_row(
                "SELECT id, username, created_at, password_hash
                 FROM users
                 WHERE username = ?1;",
                [username],
                |row| {
                    Ok(UserCredentials {
                        user: parse_user_row(row)?,
                        password_hash: row.get("password_hash")?,
                    })
                },
            )
            .optional()?;
        Ok(credentials)
    }

    fn create_session(&self, token: &str, user: UserId, expires_at: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3);",
            params![token, user, expires_at],
        )?;
        Ok(())
    }

    fn find_session_user(&self, token: &str, now_ms: i64) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT u.id, u.username, u.created_at
                 FROM sessions s
                 INNER JOIN users u ON u.id = s.user_id
                 WHERE s.token = ?1
                   AND s.expires_at > ?2;",
                params![token, now_ms],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn delete_session(&self, token: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1;", [token])?;
        Ok(())
    }

    fn purge_expired_sessions(&self, now_ms: i64) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1;", [now_ms])?;
        Ok(removed)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        created_at: row.get("created_at")?,
    })
}
