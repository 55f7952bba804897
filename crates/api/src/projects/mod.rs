//! Projects owned by authenticated users, with a read-through cache
//!
//! Lists are cached per owner and single projects per (owner, id). Every
//! write drops the owner's list and the touched project, so a successful
//! write is visible to the next read.

#[cfg(test)]
pub(crate) mod memory;
pub mod repository;

use std::sync::Arc;
use std::time::Duration;

use projects_shared::{Project, ProjectInput, ProjectUpdate, StoreResult};

use crate::cache::TtlCache;

pub use repository::{PgProjectRepository, ProjectRepository};

pub struct ProjectService {
    repo: Arc<dyn ProjectRepository>,
    lists: TtlCache<i64, Vec<Project>>,
    items: TtlCache<(i64, i64), Project>,
}

impl ProjectService {
    pub fn new(repo: Arc<dyn ProjectRepository>, cache_ttl: Duration) -> Self {
        Self {
            repo,
            lists: TtlCache::new(cache_ttl),
            items: TtlCache::new(cache_ttl),
        }
    }

    pub async fn create(&self, user_id: i64, input: ProjectInput) -> StoreResult<i64> {
        let id = self.repo.create(user_id, &input).await?;
        self.invalidate(user_id, None);

        tracing::info!(user_id = %user_id, project_id = %id, "Project created");
        Ok(id)
    }

    pub async fn get(&self, user_id: i64, id: i64) -> StoreResult<Project> {
        if let Some(project) = self.items.get(&(user_id, id)) {
            return Ok(project);
        }

        let generation = self.items.generation();
        let project = self.repo.get(user_id, id).await?;
        self.items.set_if_current((user_id, id), project.clone(), generation);
        Ok(project)
    }

    pub async fn list(&self, user_id: i64) -> StoreResult<Vec<Project>> {
        if let Some(projects) = self.lists.get(&user_id) {
            return Ok(projects);
        }

        let generation = self.lists.generation();
        let projects = self.repo.list(user_id).await?;
        self.lists.set_if_current(user_id, projects.clone(), generation);
        Ok(projects)
    }

    pub async fn update(&self, user_id: i64, id: i64, update: ProjectUpdate) -> StoreResult<()> {
        self.repo.update(user_id, id, &update).await?;
        self.invalidate(user_id, Some(id));

        tracing::debug!(user_id = %user_id, project_id = %id, "Project updated");
        Ok(())
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> StoreResult<()> {
        self.repo.delete(user_id, id).await?;
        self.invalidate(user_id, Some(id));

        tracing::info!(user_id = %user_id, project_id = %id, "Project deleted");
        Ok(())
    }

    fn invalidate(&self, user_id: i64, id: Option<i64>) {
        self.lists.invalidate(&user_id);
        if let Some(id) = id {
            self.items.invalidate(&(user_id, id));
        }

        // Writes double as the sweep point for expired entries
        self.lists.cleanup();
        self.items.cleanup();
    }
}
