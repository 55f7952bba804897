//! Password hashing
//!
//! Two schemes are supported:
//!
//! - `salted-sha256` (default): `hex(sha256(password || salt))` with one
//!   server-wide salt. Deterministic, so equal passwords produce equal hashes
//!   across users. Existing stored hashes use this format.
//! - `argon2`: Argon2id with a random per-user salt embedded in the PHC string.
//!
//! Switching an existing deployment to `argon2` invalidates every stored
//! `salted-sha256` hash, so the scheme is only ever chosen through configuration.

use std::str::FromStr;
use std::sync::OnceLock;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    SaltedSha256,
    Argon2,
}

impl FromStr for PasswordScheme {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "salted-sha256" | "sha256" => Ok(PasswordScheme::SaltedSha256),
            "argon2" | "argon2id" => Ok(PasswordScheme::Argon2),
            other => Err(PasswordError::UnknownScheme(other.to_string())),
        }
    }
}

/// Input for the stand-in hash checked when no stored hash exists
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

/// Hashes and verifies passwords with the configured scheme
#[derive(Clone)]
pub struct PasswordHasher {
    scheme: PasswordScheme,
    salt: String,
    dummy_hash: OnceLock<String>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    pub fn new(scheme: PasswordScheme, salt: impl Into<String>) -> Self {
        Self {
            scheme,
            salt: salt.into(),
            dummy_hash: OnceLock::new(),
        }
    }

    /// Derive the value stored in `users.password_hash`
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        match self.scheme {
            PasswordScheme::SaltedSha256 => Ok(hash_salted(password, &self.salt)),
            PasswordScheme::Argon2 => hash_argon2(password),
        }
    }

    /// Check `password` against a stored hash
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        match self.scheme {
            PasswordScheme::SaltedSha256 => {
                let candidate = hash_salted(password, &self.salt);
                Ok(candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into())
            }
            PasswordScheme::Argon2 => verify_argon2(password, stored_hash),
        }
    }

    /// Run a full verification against a stand-in hash and discard the result
    ///
    /// Called when the account does not exist, so that a failed login costs
    /// the same whether or not the username is known.
    pub fn verify_dummy(&self, password: &str) {
        let dummy_hash = self.dummy_hash.get_or_init(|| match self.hash(DUMMY_PASSWORD) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to derive stand-in password hash");
                String::new()
            }
        });
        let _ = self.verify(password, dummy_hash);
    }

    #[cfg(test)]
    pub(crate) fn has_dummy_hash(&self) -> bool {
        self.dummy_hash.get().is_some()
    }
}

/// Deterministic digest of `password` followed by the server-wide `salt`
pub fn hash_salted(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a password using Argon2id with a fresh random salt
pub fn hash_argon2(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Verify a password against an Argon2 PHC string
pub fn verify_argon2(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),
    #[error("Unknown password scheme: {0}")]
    UnknownScheme(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_salted_hash_is_deterministic() {
        let first = hash_salted("password123", "pepper");
        let second = hash_salted("password123", "pepper");

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salt_changes_the_digest() {
        assert_ne!(
            hash_salted("password123", "pepper"),
            hash_salted("password123", "paprika")
        );
        assert_ne!(
            hash_salted("password123", "pepper"),
            hash_salted("password124", "pepper")
        );
    }

    #[test]
    fn test_salted_digest_matches_known_value() {
        // sha256("abc") with an empty salt
        assert_eq!(
            hash_salted("abc", ""),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hasher_verify_salted() {
        let hasher = PasswordHasher::new(PasswordScheme::SaltedSha256, "pepper");
        let stored = hasher.hash("password123").unwrap();

        assert!(hasher.verify("password123", &stored).unwrap());
        assert!(!hasher.verify("wrong-password", &stored).unwrap());
    }

    #[test]
    fn test_hasher_verify_argon2() {
        let hasher = PasswordHasher::new(PasswordScheme::Argon2, "unused");
        let first = hasher.hash("SecureP@ssw0rd123").unwrap();
        let second = hasher.hash("SecureP@ssw0rd123").unwrap();

        // Per-user salts make equal passwords hash differently
        assert_ne!(first, second);
        assert!(hasher.verify("SecureP@ssw0rd123", &first).unwrap());
        assert!(!hasher.verify("wrong_password", &first).unwrap());
    }

    #[test]
    fn test_argon2_rejects_malformed_hash() {
        assert!(matches!(
            verify_argon2("password", "not-a-phc-string"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_dummy_verify_derives_a_real_hash() {
        for scheme in [PasswordScheme::SaltedSha256, PasswordScheme::Argon2] {
            let hasher = PasswordHasher::new(scheme, "pepper");
            assert!(!hasher.has_dummy_hash());

            hasher.verify_dummy("guess");
            assert!(hasher.has_dummy_hash());

            let dummy = hasher.dummy_hash.get().unwrap();
            assert!(hasher.verify(DUMMY_PASSWORD, dummy).unwrap());
        }
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!(
            "salted-sha256".parse::<PasswordScheme>().unwrap(),
            PasswordScheme::SaltedSha256
        );
        assert_eq!(
            "Argon2".parse::<PasswordScheme>().unwrap(),
            PasswordScheme::Argon2
        );
        assert!("md5".parse::<PasswordScheme>().is_err());
    }
}
