//! Use-case services. Each call takes the requesting principal explicitly
//! and checks authentication and ownership before touching a repository.

pub mod auth_service;
pub mod note_service;
