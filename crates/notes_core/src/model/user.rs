//! User and principal model.
//!
//! [`User`] never carries the password hash; see
//! [`crate::repo::user_repo::UserCredentials`].

use serde::{Deserialize, Serialize};

/// Surrogate key assigned by storage.
pub type UserId = i64;

/// Maximum username length in characters.
pub const USERNAME_MAX_CHARS: usize = 150;

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Requesting identity passed explicitly into every service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated(User),
}

impl Principal {
    /// Returns the authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<User> for Principal {
    fn from(value: User) -> Self {
        Self::Authenticated(value)
    }
}

impl From<Option<User>> for Principal {
    fn from(value: Option<User>) -> Self {
        value.map_or(Self::Anonymous, Self::Authenticated)
    }
}
