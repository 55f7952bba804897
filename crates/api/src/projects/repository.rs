//! Project persistence
//!
//! Every query is scoped by owner: another user's project behaves exactly
//! like a missing one.

use async_trait::async_trait;
use projects_shared::{Project, ProjectInput, ProjectUpdate, StoreError, StoreResult};
use sqlx::PgPool;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, user_id: i64, input: &ProjectInput) -> StoreResult<i64>;

    async fn get(&self, user_id: i64, id: i64) -> StoreResult<Project>;

    async fn list(&self, user_id: i64) -> StoreResult<Vec<Project>>;

    /// Apply the present fields; [`StoreError::NotFound`] when no row matched
    async fn update(&self, user_id: i64, id: i64, update: &ProjectUpdate) -> StoreResult<()>;

    /// [`StoreError::NotFound`] when no row matched
    async fn delete(&self, user_id: i64, id: i64) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, user_id: i64, input: &ProjectInput) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO projects (user_id, title, description, done)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.done)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get(&self, user_id: i64, id: i64) -> StoreResult<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, title, description, done
            FROM projects
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list(&self, user_id: i64) -> StoreResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, title, description, done
            FROM projects
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn update(&self, user_id: i64, id: i64, update: &ProjectUpdate) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                done = COALESCE($5, done)
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.done)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, user_id: i64, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
