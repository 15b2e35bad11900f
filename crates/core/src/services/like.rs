//! Like ("curtida") service.

use guarda_common::{AppError, AppResult};
use guarda_db::{
    entities::curtida,
    repositories::{CurtidaRepository, MemoryRepository},
};

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    curtida_repo: CurtidaRepository,
    memory_repo: MemoryRepository,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(curtida_repo: CurtidaRepository, memory_repo: MemoryRepository) -> Self {
        Self {
            curtida_repo,
            memory_repo,
        }
    }

    /// Like a memory.
    ///
    /// The lookup gives a quick answer for the common repeat click; the
    /// composite key is what actually rejects a concurrent duplicate.
    pub async fn create(&self, profile_id: &str, memory_id: &str) -> AppResult<curtida::Model> {
        self.memory_repo.get_by_id(memory_id).await?;

        if self.curtida_repo.find(memory_id, profile_id).await?.is_some() {
            return Err(AppError::Conflict("Already liked".to_string()));
        }

        self.curtida_repo.create(memory_id, profile_id).await
    }

    /// Remove a like.
    pub async fn delete(&self, profile_id: &str, memory_id: &str) -> AppResult<()> {
        if !self.curtida_repo.delete(memory_id, profile_id).await? {
            return Err(AppError::NotFound(format!("Like: {memory_id}")));
        }
        Ok(())
    }

    /// Find a like by its key.
    pub async fn find(&self, profile_id: &str, memory_id: &str) -> AppResult<curtida::Model> {
        self.curtida_repo
            .find(memory_id, profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Like: {memory_id}")))
    }

    /// Whether the profile likes the memory.
    pub async fn has_liked(&self, profile_id: &str, memory_id: &str) -> AppResult<bool> {
        Ok(self.curtida_repo.find(memory_id, profile_id).await?.is_some())
    }

    /// Number of likes on a memory.
    pub async fn count(&self, memory_id: &str) -> AppResult<u64> {
        self.curtida_repo.count_by_memory(memory_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use guarda_db::entities::memory;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> LikeService {
        let conn = Arc::new(db.into_connection());
        LikeService::new(
            CurtidaRepository::new(Arc::clone(&conn)),
            MemoryRepository::new(conn),
        )
    }

    #[tokio::test]
    async fn test_create_on_missing_memory() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<memory::Model>::new()]),
        );

        let result = service.create("p1", "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_like_is_not_found() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]));

        let result = service.delete("p1", "m1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_has_liked() {
        let like = curtida::Model {
            memory_id: "m1".to_string(),
            profile_id: "p1".to_string(),
            created_at: Utc::now().into(),
        };
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[like]]),
        );

        assert!(service.has_liked("p1", "m1").await.unwrap());
    }
}
