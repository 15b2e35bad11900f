//! Curtida (like) repository.

use std::sync::Arc;

use chrono::Utc;
use guarda_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use crate::entities::{Curtida, curtida};
use crate::map_write_err;

/// Repository for like operations.
#[derive(Clone)]
pub struct CurtidaRepository {
    db: Arc<DatabaseConnection>,
}

impl CurtidaRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by its composite key.
    pub async fn find(&self, memory_id: &str, profile_id: &str) -> AppResult<Option<curtida::Model>> {
        Curtida::find_by_id((memory_id.to_string(), profile_id.to_string()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like. The composite primary key rejects duplicates as `Conflict`.
    pub async fn create(&self, memory_id: &str, profile_id: &str) -> AppResult<curtida::Model> {
        let now = Utc::now();
        let model = curtida::ActiveModel {
            memory_id: Set(memory_id.to_string()),
            profile_id: Set(profile_id.to_string()),
            created_at: Set(now.into()),
        };

        Curtida::insert(model)
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "Already liked"))?;

        Ok(curtida::Model {
            memory_id: memory_id.to_string(),
            profile_id: profile_id.to_string(),
            created_at: now.into(),
        })
    }

    /// Delete a like. Returns `false` if there was none.
    pub async fn delete(&self, memory_id: &str, profile_id: &str) -> AppResult<bool> {
        let result = Curtida::delete_by_id((memory_id.to_string(), profile_id.to_string()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Count likes on a memory.
    pub async fn count_by_memory(&self, memory_id: &str) -> AppResult<u64> {
        Curtida::find()
            .filter(curtida::Column::MemoryId.eq(memory_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_create_returns_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = CurtidaRepository::new(db);
        let like = repo.create("m1", "p1").await.unwrap();

        assert_eq!(like.memory_id, "m1");
        assert_eq!(like.profile_id, "p1");
    }

    #[tokio::test]
    async fn test_delete_missing_like() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = CurtidaRepository::new(db);

        assert!(!repo.delete("m1", "p1").await.unwrap());
    }
}
