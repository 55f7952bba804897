//! Shared persistence types and utilities for the projects service
//!
//! Holds the database pool setup, the store error type, and the row types
//! used by the API crate's stores.

pub mod db;
pub mod error;
pub mod types;

pub use db::*;
pub use error::*;
pub use types::*;
