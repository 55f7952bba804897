//! Projects API Library
//!
//! HTTP service for user-owned projects, with password sign-in, JWT access
//! tokens and rotating refresh tokens.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod projects;
pub mod routes;
pub mod state;

pub use config::{Config, LogFormat};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
