//! In-memory stores for exercising the auth service without Postgres

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use projects_shared::{
    NewUser, RefreshTokenRecord, StoreError, StoreResult, User, UserCredentials,
};
use time::OffsetDateTime;

use super::tokens::RefreshTokenStore;
use super::users::UserStore;

#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<(User, String)>>,
}

impl MemoryUserStore {
    pub fn password_hash_of(&self, username: &str) -> Option<String> {
        let rows = self.rows.lock().unwrap();
        rows.iter()
            .find(|(user, _)| user.username == username)
            .map(|(_, hash)| hash.clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|(u, _)| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict("users_username_key".to_string()));
        }

        let id = rows.len() as i64 + 1;
        rows.push((
            User {
                id,
                name: user.name,
                email: user.email,
                username: user.username,
            },
            user.password_hash,
        ));
        Ok(id)
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<UserCredentials> {
        let rows = self.rows.lock().unwrap();
        rows.iter()
            .find(|(user, _)| user.username == username)
            .map(|(user, hash)| UserCredentials {
                id: user.id,
                password_hash: hash.clone(),
            })
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        let rows = self.rows.lock().unwrap();
        rows.iter()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone())
            .ok_or(StoreError::NotFound)
    }
}

/// Refresh token store with switchable write failures
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, RefreshTokenRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryRefreshTokenStore {
    /// Make every create, delete and consume fail with a database error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn owner_of(&self, token: &str) -> Option<i64> {
        self.tokens.lock().unwrap().get(token).map(|r| r.user_id)
    }

    pub fn count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> StoreResult<()> {
        self.check_writable()?;
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.contains_key(token) {
            return Err(StoreError::Conflict("refresh_tokens_pkey".to_string()));
        }
        tokens.insert(
            token.to_string(),
            RefreshTokenRecord {
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn find(&self, token: &str) -> StoreResult<RefreshTokenRecord> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, token: &str) -> StoreResult<()> {
        self.check_writable()?;
        self.tokens.lock().unwrap().remove(token);
        Ok(())
    }

    async fn consume(&self, token: &str) -> StoreResult<RefreshTokenRecord> {
        self.check_writable()?;
        self.tokens
            .lock()
            .unwrap()
            .remove(token)
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[tokio::test]
    async fn find_does_not_consume() {
        let store = MemoryRefreshTokenStore::default();
        let expires_at = OffsetDateTime::now_utc() + Duration::hours(1);
        store.create(3, "abc", expires_at).await.unwrap();

        assert_eq!(store.find("abc").await.unwrap().user_id, 3);
        assert_eq!(store.find("abc").await.unwrap().user_id, 3);
        assert_eq!(store.consume("abc").await.unwrap().expires_at, expires_at);
        assert_eq!(store.find("abc").await, Err(StoreError::NotFound));
    }
}
