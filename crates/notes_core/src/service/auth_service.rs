//! Account and session use-case service.
//!
//! # Responsibility
//! - Register accounts with hashed passwords.
//! - Exchange credentials for sessions and sessions for principals.
//!
//! # Invariants
//! - Unknown usernames and wrong passwords fail identically and both pay
//!   for one password verification.
//! - Unknown or expired session tokens resolve to `Principal::Anonymous`.
//! - Passwords and tokens are never logged.

use crate::auth::{hash_password, new_session_token, verify_password, Session, DEFAULT_SESSION_TTL};
use crate::db::now_epoch_ms;
use crate::model::user::{Principal, User, USERNAME_MAX_CHARS};
use crate::repo::user_repo::{UserCredentials, UserRepository};
use crate::repo::RepoError;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Hash checked when the username is unknown.
static UNKNOWN_USER_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("unknown-user-password").ok());

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Service error for account and session use-cases.
#[derive(Debug)]
pub enum AuthError {
    InvalidUsername(String),
    InvalidPassword(String),
    PasswordMismatch,
    UsernameTaken(String),
    InvalidCredentials,
    PasswordHash(String),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(reason) => write!(f, "{reason}"),
            Self::InvalidPassword(reason) => write!(f, "{reason}"),
            Self::PasswordMismatch => write!(f, "The two password fields didn't match."),
            Self::UsernameTaken(_) => write!(f, "A user with that username already exists."),
            Self::InvalidCredentials => write!(
                f,
                "Please enter a correct username and password. Note that both fields may be case-sensitive."
            ),
            Self::PasswordHash(details) => write!(f, "password hashing failed: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UsernameTaken(username) => Self::UsernameTaken(username),
            other => Self::Repo(other),
        }
    }
}

impl AuthError {
    /// Whether the error is caused by user input rather than the server.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::PasswordHash(_) | Self::Repo(_))
    }
}

/// Account/session service facade over repository implementations.
pub struct AuthService<R: UserRepository> {
    repo: R,
    session_ttl: Duration,
}

impl<R: UserRepository> AuthService<R> {
    /// Creates a service with the default session lifetime.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Overrides the lifetime of sessions opened by [`Self::start_session`].
    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    /// Registers an account after checking the password confirmation.
    pub fn sign_up(
        &self,
        username: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<User, AuthError> {
        self.register(&prepare_account(username, password, password_confirm)?)
    }

    /// Registers an account without a confirmation step.
    pub fn create_user(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.register(&prepare_account(username, password, password)?)
    }

    /// Stores an account produced by [`prepare_account`].
    pub fn register(&self, account: &NewAccount) -> Result<User, AuthError> {
        let user = self
            .repo
            .create_user(&account.username, &account.password_hash)?;
        info!(
            "event=user_create module=auth_service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Verifies credentials and opens a new session.
    pub fn log_in(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = self.find_credentials(username)?;
        let user = check_password(credentials, password)?;
        self.start_session(user)
    }

    /// Looks up the stored credentials for a login attempt.
    pub fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>, AuthError> {
        Ok(self.repo.find_credentials(username.trim())?)
    }

    /// Opens a session for a user whose password was already checked.
    pub fn start_session(&self, user: User) -> Result<Session, AuthError> {
        let now = now_epoch_ms();
        self.repo.purge_expired_sessions(now)?;
        let ttl_ms = i64::try_from(self.session_ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_ms);
        let token = new_session_token();
        self.repo.create_session(&token, user.id, expires_at)?;
        info!("event=login module=auth_service status=ok user_id={}", user.id);

        Ok(Session {
            token,
            user,
            expires_at,
        })
    }

    /// Resolves a session token into the requesting principal.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let Some(token) = token.filter(|value| !value.is_empty()) else {
            return Ok(Principal::Anonymous);
        };

        let now = now_epoch_ms();
        let user = self.repo.find_session_user(token, now)?;
        if user.is_none() {
            self.repo.purge_expired_sessions(now)?;
        }
        Ok(Principal::from(user))
    }

    /// Ends a session. Unknown tokens are ignored.
    pub fn log_out(&self, token: &str) -> Result<(), AuthError> {
        self.repo.delete_session(token)?;
        info!("event=logout module=auth_service status=ok");
        Ok(())
    }
}

/// Validated signup input with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
}

/// Validates signup input and hashes the password.
///
/// Hashing is CPU-bound and touches no storage, so callers on an async
/// runtime run this on a blocking thread before taking a connection.
pub fn prepare_account(
    username: &str,
    password: &str,
    password_confirm: &str,
) -> Result<NewAccount, AuthError> {
    if password != password_confirm {
        return Err(AuthError::PasswordMismatch);
    }
    let username = validate_username(username)?;
    validate_password(password)?;
    let password_hash = hash_password(password).map_err(AuthError::PasswordHash)?;
    Ok(NewAccount {
        username: username.to_string(),
        password_hash,
    })
}

/// Checks a login password against the stored credentials, if any.
///
/// Unknown usernames are verified against [`UNKNOWN_USER_HASH`] so both
/// rejections cost one Argon2 verification.
pub fn check_password(
    credentials: Option<UserCredentials>,
    password: &str,
) -> Result<User, AuthError> {
    let Some(credentials) = credentials else {
        if let Some(hash) = UNKNOWN_USER_HASH.as_deref() {
            let _ = verify_password(password, hash);
        }
        warn!("event=login module=auth_service status=rejected reason=unknown_user");
        return Err(AuthError::InvalidCredentials);
    };

    let verified =
        verify_password(password, &credentials.password_hash).map_err(AuthError::PasswordHash)?;
    if !verified {
        warn!(
            "event=login module=auth_service status=rejected reason=bad_password user_id={}",
            credentials.user.id
        );
        return Err(AuthError::InvalidCredentials);
    }
    Ok(credentials.user)
}

fn validate_username(username: &str) -> Result<&str, AuthError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidUsername(
            "This field is required.".to_string(),
        ));
    }
    if trimmed.chars().count() > USERNAME_MAX_CHARS {
        return Err(AuthError::InvalidUsername(format!(
            "Ensure this value has at most {USERNAME_MAX_CHARS} characters."
        )));
    }
    if !USERNAME_RE.is_match(trimmed) {
        return Err(AuthError::InvalidUsername(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        ));
    }
    Ok(trimmed)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(AuthError::InvalidPassword(format!(
            "This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_password, validate_password, validate_username, AuthError, UNKNOWN_USER_HASH};

    #[test]
    fn username_accepts_unicode_letters_and_allowed_symbols() {
        assert_eq!(validate_username(" Автор ").unwrap(), "Автор");
        assert_eq!(validate_username("a.b@c+d-e_f").unwrap(), "a.b@c+d-e_f");
    }

    #[test]
    fn username_rejects_spaces_and_blank_values() {
        assert!(matches!(
            validate_username("Не автор"),
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            validate_username("   "),
            Err(AuthError::InvalidUsername(_))
        ));
    }

    #[test]
    fn password_requires_minimum_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn unknown_user_is_checked_against_placeholder_hash() {
        assert!(UNKNOWN_USER_HASH
            .as_deref()
            .is_some_and(|hash| hash.starts_with("$argon2")));
        assert!(matches!(
            check_password(None, "whatever password"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
