//! Refresh token persistence
//!
//! Refresh tokens are opaque 32-byte random values, hex-encoded, stored with
//! their owner and absolute expiry. They are single use: exchanging one
//! removes its row via [`RefreshTokenStore::consume`], which deletes and returns
//! the row in one statement so two concurrent exchanges cannot both succeed.

use async_trait::async_trait;
use projects_shared::{RefreshTokenRecord, StoreError, StoreResult};
use sqlx::PgPool;
use time::OffsetDateTime;

/// Generate a secure random refresh token
///
/// Returns a 32-byte hex-encoded token (64 characters)
pub fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a new token for `user_id` expiring at `expires_at`
    async fn create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> StoreResult<()>;

    /// Look up a token; [`StoreError::NotFound`] when no row matches
    async fn find(&self, token: &str) -> StoreResult<RefreshTokenRecord>;

    /// Remove a token; removing an absent token succeeds
    async fn delete(&self, token: &str) -> StoreResult<()>;

    /// Delete a token and return the removed row; [`StoreError::NotFound`]
    /// when nothing was deleted
    async fn consume(&self, token: &str) -> StoreResult<RefreshTokenRecord>;
}

/// Postgres-backed refresh token store (`refresh_tokens` table)
#[derive(Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, expires_at = %expires_at, "Refresh token stored");

        Ok(())
    }

    async fn find(&self, token: &str) -> StoreResult<RefreshTokenRecord> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT user_id, expires_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or(StoreError::NotFound)
    }

    async fn delete(&self, token: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn consume(&self, token: &str) -> StoreResult<RefreshTokenRecord> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            DELETE FROM refresh_tokens
            WHERE token = $1
            RETURNING user_id, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_token_generation() {
        let token1 = generate_token();
        let token2 = generate_token();

        // Tokens should be 64 characters (32 bytes hex-encoded)
        assert_eq!(token1.len(), 64);
        assert_eq!(token2.len(), 64);

        // Tokens should be unique
        assert_ne!(token1, token2);

        // Tokens should only contain hex characters
        assert!(token1.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(token2.chars().all(|c| c.is_ascii_hexdigit()));
    }

    async fn pg_store() -> (PgRefreshTokenStore, PgPool, i64) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = projects_shared::create_pool(&url, 2).await.expect("pool");
        projects_shared::run_migrations(&pool).await.expect("migrations");

        let suffix = generate_token();
        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, email, username, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind("Token Test")
        .bind(format!("{}@example.com", &suffix[..12]))
        .bind(format!("tokens-{}", &suffix[..12]))
        .bind("hash")
        .fetch_one(&pool)
        .await
        .expect("insert user");

        (PgRefreshTokenStore::new(pool.clone()), pool, user_id)
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_pg_create_find_consume() {
        let (store, _pool, user_id) = pg_store().await;
        let token = generate_token();
        let expires_at = (OffsetDateTime::now_utc() + Duration::hours(2))
            .replace_nanosecond(0)
            .unwrap();

        store.create(user_id, &token, expires_at).await.unwrap();

        let found = store.find(&token).await.unwrap();
        assert_eq!(found.user_id, user_id);
        assert_eq!(found.expires_at, expires_at);

        let consumed = store.consume(&token).await.unwrap();
        assert_eq!(consumed.user_id, user_id);

        // Second consume removes nothing
        assert_eq!(store.consume(&token).await, Err(StoreError::NotFound));
        assert_eq!(store.find(&token).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_pg_delete_is_idempotent() {
        let (store, _pool, user_id) = pg_store().await;
        let keep = generate_token();
        let gone = generate_token();
        let expires_at = OffsetDateTime::now_utc() + Duration::hours(1);

        store.create(user_id, &keep, expires_at).await.unwrap();
        store.create(user_id, &gone, expires_at).await.unwrap();

        store.delete(&gone).await.unwrap();
        store.delete(&gone).await.unwrap();
        store.delete("never-existed").await.unwrap();

        assert!(store.find(&keep).await.is_ok());
        assert_eq!(store.find(&gone).await, Err(StoreError::NotFound));
    }
}
