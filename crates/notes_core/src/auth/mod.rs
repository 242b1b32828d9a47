//! Credential and session primitives shared by the auth service.

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password};
pub use session::{new_session_token, Session, DEFAULT_SESSION_TTL};
