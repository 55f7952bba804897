//! Authentication service
//!
//! Composes the password hasher, access token signer and refresh token store
//! into the account and token lifecycle:
//!
//! - register: hash and persist a new user
//! - login: check credentials, then issue a token pair
//! - refresh: consume the presented refresh token and issue a fresh pair
//! - authorize: map a bearer access token to its user id
//!
//! Refresh tokens are single use. The presented token is removed with one
//! conditional delete before anything new is issued, so replaying a token
//! (or racing two refreshes with it) yields at most one new pair.

use std::sync::Arc;

use projects_shared::{NewUser, StoreError, User};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use super::jwt::{JwtError, JwtManager};
use super::password::PasswordHasher;
use super::tokens::{generate_token, RefreshTokenStore};
use super::users::UserStore;
use crate::config::AuthConfig;

/// Sign-up fields, validated at the HTTP boundary before reaching the service
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Access token plus the refresh token persisted alongside it
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub refresh_expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Refresh token expired")]
    ExpiredRefreshToken,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    fn internal(context: &'static str, err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "{}", context);
        AuthError::Internal(context.to_string())
    }
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    jwt: JwtManager,
    hasher: PasswordHasher,
    refresh_token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            users,
            tokens,
            jwt: JwtManager::new(&config.signing_secret, config.access_token_ttl),
            hasher: PasswordHasher::new(config.password_scheme, config.password_salt.clone()),
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    /// Hash the password and persist the user, returning the new id
    pub async fn register(&self, registration: Registration) -> Result<i64, AuthError> {
        let password_hash = self
            .hasher
            .hash(&registration.password)
            .map_err(|e| AuthError::internal("Failed to hash password", e))?;

        let user = NewUser {
            name: registration.name,
            email: registration.email,
            username: registration.username,
            password_hash,
        };

        match self.users.create(user).await {
            Ok(id) => {
                tracing::info!(user_id = %id, "User registered");
                Ok(id)
            }
            Err(StoreError::Conflict(constraint)) => {
                tracing::debug!(constraint = %constraint, "Registration rejected: duplicate user");
                Err(AuthError::Conflict(
                    "Username or email already registered".to_string(),
                ))
            }
            Err(e) => Err(AuthError::internal("Failed to create user", e)),
        }
    }

    /// Resolve a username and password to a user id
    ///
    /// An unknown username and a wrong password are indistinguishable.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<i64, AuthError> {
        let credentials = match self.users.find_credentials(username).await {
            Ok(credentials) => credentials,
            Err(StoreError::NotFound) => {
                // Same hashing cost as a wrong password
                self.hasher.verify_dummy(password);
                return Err(AuthError::Unauthorized);
            }
            Err(e) => return Err(AuthError::internal("Failed to load credentials", e)),
        };

        match self.hasher.verify(password, &credentials.password_hash) {
            Ok(true) => Ok(credentials.id),
            Ok(false) => Err(AuthError::Unauthorized),
            Err(e) => {
                // Stored hash written under another scheme
                tracing::warn!(
                    user_id = %credentials.id,
                    error = %e,
                    "Stored password hash unreadable"
                );
                Err(AuthError::Unauthorized)
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user_id = self.verify_credentials(username, password).await?;
        let pair = self.issue_token_pair(user_id).await?;

        tracing::info!(user_id = %user_id, "User logged in");
        Ok(pair)
    }

    /// Sign an access token and persist a fresh refresh token for `user_id`
    pub async fn issue_token_pair(&self, user_id: i64) -> Result<TokenPair, AuthError> {
        self.issue_token_pair_at(user_id, OffsetDateTime::now_utc()).await
    }

    /// Issue a pair as if the current time were `now`
    pub async fn issue_token_pair_at(
        &self,
        user_id: i64,
        now: OffsetDateTime,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self
            .jwt
            .issue_at(user_id, now)
            .map_err(|e| AuthError::internal("Failed to sign access token", e))?;

        let refresh_token = generate_token();
        let refresh_expires_at = now + self.refresh_token_ttl;

        // No access token leaves without its refresh token persisted
        self.tokens
            .create(user_id, &refresh_token, refresh_expires_at)
            .await
            .map_err(|e| AuthError::internal("Failed to store refresh token", e))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.jwt.access_token_expiry_seconds(),
            refresh_expires_at,
        })
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The presented token is deleted whether or not it turns out to be
    /// expired, so it can never be exchanged twice.
    pub async fn refresh_token_pair(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let record = match self.tokens.consume(refresh_token).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => return Err(AuthError::InvalidRefreshToken),
            Err(e) => return Err(AuthError::internal("Failed to consume refresh token", e)),
        };

        let now = OffsetDateTime::now_utc();
        if record.is_expired_at(now) {
            tracing::debug!(user_id = %record.user_id, "Expired refresh token presented");
            return Err(AuthError::ExpiredRefreshToken);
        }

        let pair = self.issue_token_pair_at(record.user_id, now).await?;
        tracing::debug!(user_id = %record.user_id, "Refresh token rotated");
        Ok(pair)
    }

    /// Verify a bearer access token and return its user id
    pub fn authorize(&self, access_token: &str) -> Result<i64, AuthError> {
        self.jwt.verify(access_token).map_err(|e| match e {
            JwtError::Invalid => AuthError::Unauthorized,
            other => AuthError::internal("Access token verification failed", other),
        })
    }

    /// Drop a refresh token (logout); unknown tokens are ignored
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.tokens
            .delete(refresh_token)
            .await
            .map_err(|e| AuthError::internal("Failed to delete refresh token", e))
    }

    pub async fn profile(&self, user_id: i64) -> Result<User, AuthError> {
        match self.users.find_by_id(user_id).await {
            Ok(user) => Ok(user),
            // Token outlived its user
            Err(StoreError::NotFound) => Err(AuthError::Unauthorized),
            Err(e) => Err(AuthError::internal("Failed to load user", e)),
        }
    }

    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.jwt.access_token_expiry_seconds()
    }
}
