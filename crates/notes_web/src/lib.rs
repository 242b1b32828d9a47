//! Server-rendered HTTP surface for the notes service.
//!
//! # Responsibility
//! - Map routes onto `notes_core` services.
//! - Resolve the session cookie into a `Principal` on every request.
//! - Render pages and translate service outcomes into redirects and statuses.
//!
//! # Invariants
//! - The connection lock is never held across an `.await`.
//! - Someone else's note and a missing note both render as 404.

pub mod error;
mod handlers;
pub mod http;
mod render;
pub mod server;
pub mod settings;
mod state;

pub use error::WebError;
pub use http::build_router;
pub use server::serve;
pub use settings::Settings;
pub use state::{AppState, SESSION_COOKIE};
