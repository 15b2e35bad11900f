//! Posting repository.
//!
//! Owns the two multi-row write paths: the score recount and the
//! delete-and-reassign of a root posting.

use std::sync::Arc;

use guarda_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};

use crate::entities::{Knowledge, Posting, knowledge, posting};
use crate::map_write_err;

/// Result of deleting a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedPosting {
    /// The deleted posting.
    pub posting: posting::Model,
    /// Reply promoted to root, when a root with replies was deleted.
    pub promoted_root_id: Option<String>,
    /// Replies moved under the promoted root.
    pub reparented: u64,
}

/// Repository for posting operations.
#[derive(Clone)]
pub struct PostingRepository {
    db: Arc<DatabaseConnection>,
}

impl PostingRepository {
    /// Create a new posting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a posting by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<posting::Model>> {
        Posting::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a posting by ID or fail with `NotFound`.
    pub async fn get_by_id(&self, id: &str) -> AppResult<posting::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Posting: {id}")))
    }

    /// Find a posting by permalink.
    pub async fn find_by_permalink(&self, permalink: &str) -> AppResult<Option<posting::Model>> {
        Posting::find()
            .filter(posting::Column::Permalink.eq(permalink))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a posting. A permalink collision is a `Conflict`.
    pub async fn create(&self, model: posting::ActiveModel) -> AppResult<posting::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "Permalink already exists"))
    }

    /// Direct replies, oldest first.
    pub async fn find_replies(&self, parent_id: &str) -> AppResult<Vec<posting::Model>> {
        find_replies_on(self.db.as_ref(), parent_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Root postings of a city, highest score first, then newest.
    pub async fn find_roots_by_city(&self, city_id: &str) -> AppResult<Vec<posting::Model>> {
        Posting::find()
            .filter(posting::Column::CityId.eq(city_id))
            .filter(posting::Column::ParentId.is_null())
            .order_by_desc(posting::Column::Score)
            .order_by_desc(posting::Column::CreatedAt)
            .order_by_desc(posting::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count direct replies of a posting.
    pub async fn count_replies(&self, id: &str) -> AppResult<u64> {
        count_replies_on(self.db.as_ref(), id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all postings.
    pub async fn count(&self) -> AppResult<u64> {
        Posting::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recount the score from live rows and store it.
    pub async fn recompute_score(&self, id: &str) -> AppResult<i32> {
        recompute_score_on(self.db.as_ref(), id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Posting: {id}")))
    }

    /// Delete a reply, or a root without replies.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Posting::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a root posting, promoting its oldest reply.
    ///
    /// In one transaction: the oldest direct reply becomes root, the other
    /// replies move under it, the original row is deleted and the promoted
    /// root's score is recounted. Any failure rolls everything back.
    pub async fn delete_with_reassignment(&self, id: &str) -> AppResult<DeletedPosting> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let posting = Posting::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Posting: {id}")))?;

        let replies = find_replies_on(&txn, id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut promoted_root_id = None;
        let mut reparented = 0;

        if let Some(promoted) = replies.first() {
            Posting::update_many()
                .col_expr(posting::Column::ParentId, Expr::value(Option::<String>::None))
                .filter(posting::Column::Id.eq(promoted.id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            reparented = Posting::update_many()
                .col_expr(
                    posting::Column::ParentId,
                    Expr::value(Some(promoted.id.clone())),
                )
                .filter(posting::Column::ParentId.eq(id))
                .filter(posting::Column::Id.ne(promoted.id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .rows_affected;

            promoted_root_id = Some(promoted.id.clone());
        }

        Posting::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(promoted_id) = promoted_root_id.as_deref() {
            recompute_score_on(&txn, promoted_id)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(DeletedPosting {
            posting,
            promoted_root_id,
            reparented,
        })
    }
}

async fn find_replies_on<C: ConnectionTrait>(
    conn: &C,
    parent_id: &str,
) -> Result<Vec<posting::Model>, DbErr> {
    Posting::find()
        .filter(posting::Column::ParentId.eq(parent_id))
        .order_by_asc(posting::Column::CreatedAt)
        .order_by_asc(posting::Column::Id)
        .all(conn)
        .await
}

async fn count_replies_on<C: ConnectionTrait>(conn: &C, id: &str) -> Result<u64, DbErr> {
    Posting::find()
        .filter(posting::Column::ParentId.eq(id))
        .count(conn)
        .await
}

/// Returns `None` if the posting does not exist.
async fn recompute_score_on<C: ConnectionTrait>(conn: &C, id: &str) -> Result<Option<i32>, DbErr> {
    let replies = count_replies_on(conn, id).await?;
    let acknowledgments = Knowledge::find()
        .filter(knowledge::Column::PostingId.eq(id))
        .count(conn)
        .await?;

    let score = i32::try_from(replies + acknowledgments).unwrap_or(i32::MAX);

    let result = Posting::update_many()
        .col_expr(posting::Column::Score, Expr::value(score))
        .filter(posting::Column::Id.eq(id))
        .exec(conn)
        .await?;

    Ok((result.rows_affected > 0).then_some(score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::posting::PostingType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_posting(id: &str, parent_id: Option<&str>) -> posting::Model {
        posting::Model {
            id: id.to_string(),
            owner_id: "p1".to_string(),
            city_id: "c1".to_string(),
            memory_id: None,
            parent_id: parent_id.map(ToString::to_string),
            posting_type: PostingType::Text,
            text: Some("hello".to_string()),
            url: None,
            permalink: format!("1700000000000-{id}"),
            score: 0,
            created_at: Utc::now().into(),
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }
    }

    #[tokio::test]
    async fn test_recompute_score_adds_replies_and_knowledge() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(2)]])
                .append_query_results([[count_row(3)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostingRepository::new(db);
        let score = repo.recompute_score("root").await.unwrap();

        assert_eq!(score, 5);
    }

    #[tokio::test]
    async fn test_recompute_score_missing_posting() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(0)]])
                .append_query_results([[count_row(0)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = PostingRepository::new(db);
        let result = repo.recompute_score("gone").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_root_without_replies() {
        let root = create_test_posting("root", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[root.clone()]])
                .append_query_results([Vec::<posting::Model>::new()])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostingRepository::new(db);
        let deleted = repo.delete_with_reassignment("root").await.unwrap();

        assert_eq!(deleted.posting.id, "root");
        assert!(deleted.promoted_root_id.is_none());
        assert_eq!(deleted.reparented, 0);
    }

    #[tokio::test]
    async fn test_find_replies() {
        let r1 = create_test_posting("r1", Some("root"));
        let r2 = create_test_posting("r2", Some("root"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = PostingRepository::new(db);
        let replies = repo.find_replies("root").await.unwrap();

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].id, "r1");
    }
}
