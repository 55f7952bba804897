//! Row and input types shared between stores and handlers

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

// =============================================================================
// Users
// =============================================================================

/// Public user profile (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
}

/// User about to be inserted; `password_hash` is already derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// Stored credentials looked up by username at sign-in
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
}

// =============================================================================
// Refresh tokens
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RefreshTokenRecord {
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

impl RefreshTokenRecord {
    /// A token whose expiry is at or before `now` can no longer be exchanged
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

// =============================================================================
// Projects
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub done: bool,
}

/// Fields accepted when creating a project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub done: bool,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.done.is_none()
    }

    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(done) = self.done {
            project.done = done;
        }
    }
}
