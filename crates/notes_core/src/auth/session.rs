//! Login session values.

use crate::model::user::User;
use std::time::Duration;
use uuid::Uuid;

/// Two weeks.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Established login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token carried in the session cookie.
    pub token: String,
    pub user: User,
    /// Unix epoch milliseconds.
    pub expires_at: i64,
}

/// Generates a fresh random session token.
pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}
