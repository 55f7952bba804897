//! Access token issuance and verification
//!
//! Access tokens are HS256-signed JWTs carrying only the user id (as a
//! string subject), issued-at and expiry. They are never persisted; a token is
//! valid exactly when its signature verifies and it has not expired.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// JWT claims structure for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID, decimal string)
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// JWT manager for access token operations
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager from the signing secret and access token lifetime
    pub fn new(secret: &str, access_token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_ttl,
        }
    }

    /// Issue an access token for `user_id`, valid from now
    pub fn issue(&self, user_id: i64) -> Result<String, JwtError> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    /// Issue an access token as if the current time were `now`
    pub fn issue_at(&self, user_id: i64, now: OffsetDateTime) -> Result<String, JwtError> {
        let exp = now + self.access_token_ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };

        // Explicit algorithm: only HS256 tokens are ever produced
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Verify an access token and return the user id in its subject
    ///
    /// Wrong algorithm, bad signature, expiry, and a missing or non-numeric
    /// subject all collapse into [`JwtError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<i64, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "access token rejected");
                JwtError::Invalid
            })?;

        claims.sub.parse::<i64>().map_err(|_| {
            tracing::debug!("access token rejected: non-numeric subject");
            JwtError::Invalid
        })
    }

    /// Get access token lifetime in seconds
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_ttl.whole_seconds()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Invalid token")]
    Invalid,
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}
