//! User persistence

use async_trait::async_trait;
use projects_shared::{NewUser, StoreError, StoreResult, User, UserCredentials};
use sqlx::PgPool;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user and return its id; [`StoreError::Conflict`] when the
    /// username or email is taken
    async fn create(&self, user: NewUser) -> StoreResult<i64>;

    /// Stored hash for `username`, used at sign-in
    async fn find_credentials(&self, username: &str) -> StoreResult<UserCredentials>;

    async fn find_by_id(&self, id: i64) -> StoreResult<User>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, email, username, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<UserCredentials> {
        sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        sqlx::query_as::<_, User>("SELECT id, name, email, username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_pg_user_round_trip() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = projects_shared::create_pool(&url, 2).await.unwrap();
        projects_shared::run_migrations(&pool).await.unwrap();
        let store = PgUserStore::new(pool);

        let tag = crate::auth::tokens::generate_token();
        let user = NewUser {
            name: "Alice".to_string(),
            email: format!("{}@example.com", &tag[..10]),
            username: format!("alice-{}", &tag[..10]),
            password_hash: "stored-hash".to_string(),
        };

        let id = store.create(user.clone()).await.unwrap();

        let creds = store.find_credentials(&user.username).await.unwrap();
        assert_eq!(creds.id, id);
        assert_eq!(creds.password_hash, "stored-hash");

        let profile = store.find_by_id(id).await.unwrap();
        assert_eq!(profile.username, user.username);

        assert!(matches!(
            store.create(user).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(
            store.find_credentials("nobody-by-this-name").await,
            Err(StoreError::NotFound)
        );
    }
}
