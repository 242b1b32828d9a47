//! Domain model for notes, their authors and the requesting principal.
//!
//! # Invariants
//! - Every note has exactly one author, fixed at creation.
//! - Note slugs are unique across the whole collection, not per author.

pub mod note;
pub mod user;
