//! Knowledge acknowledgment repository.

use std::sync::Arc;

use guarda_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

use crate::entities::{Knowledge, knowledge};
use crate::map_write_err;

/// Repository for knowledge operations.
#[derive(Clone)]
pub struct KnowledgeRepository {
    db: Arc<DatabaseConnection>,
}

impl KnowledgeRepository {
    /// Create a new knowledge repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the acknowledgment of a profile on a posting.
    pub async fn find_by_profile_and_posting(
        &self,
        profile_id: &str,
        posting_id: &str,
    ) -> AppResult<Option<knowledge::Model>> {
        Knowledge::find()
            .filter(knowledge::Column::ProfileId.eq(profile_id))
            .filter(knowledge::Column::PostingId.eq(posting_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an acknowledgment. A duplicate (profile, posting) is a `Conflict`.
    pub async fn create(&self, model: knowledge::ActiveModel) -> AppResult<knowledge::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "Already acknowledged"))
    }

    /// Delete an acknowledgment by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Knowledge::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count acknowledgments on a posting.
    pub async fn count_by_posting(&self, posting_id: &str) -> AppResult<u64> {
        Knowledge::find()
            .filter(knowledge::Column::PostingId.eq(posting_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_profile_and_posting() {
        let ack = knowledge::Model {
            id: "k1".to_string(),
            profile_id: "p1".to_string(),
            posting_id: "post1".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ack.clone()]])
                .append_query_results([Vec::<knowledge::Model>::new()])
                .into_connection(),
        );

        let repo = KnowledgeRepository::new(db);

        assert_eq!(
            repo.find_by_profile_and_posting("p1", "post1").await.unwrap(),
            Some(ack)
        );
        assert!(
            repo.find_by_profile_and_posting("p2", "post1")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_count_by_posting() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(4))
                }]])
                .into_connection(),
        );

        let repo = KnowledgeRepository::new(db);

        assert_eq!(repo.count_by_posting("post1").await.unwrap(), 4);
    }
}
