//! In-memory project repository that counts reads

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use projects_shared::{Project, ProjectInput, ProjectUpdate, StoreError, StoreResult};

use super::repository::ProjectRepository;

#[derive(Default)]
pub struct MemoryProjectRepository {
    rows: Mutex<Vec<Project>>,
    next_id: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryProjectRepository {
    /// Number of `get` and `list` calls that reached the repository
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn create(&self, user_id: i64, input: &ProjectInput) -> StoreResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.rows.lock().unwrap().push(Project {
            id,
            user_id,
            title: input.title.clone(),
            description: input.description.clone(),
            done: input.done,
        });
        Ok(id)
    }

    async fn get(&self, user_id: i64, id: i64) -> StoreResult<Project> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, user_id: i64) -> StoreResult<Vec<Project>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, user_id: i64, id: i64, update: &ProjectUpdate) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let project = rows
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        update.apply_to(project);
        Ok(())
    }

    async fn delete(&self, user_id: i64, id: i64) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| !(p.id == id && p.user_id == user_id));
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
