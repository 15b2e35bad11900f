//! Report repository.

use std::sync::Arc;

use chrono::Utc;
use guarda_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::entities::{Report, report, report::ReportStatus};

/// Repository for report operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move a pending report to a terminal status.
    ///
    /// The update only matches rows still `pending`, so two admins racing on
    /// the same report cannot both win. Returns `None` when nothing matched.
    pub async fn resolve(
        &self,
        id: &str,
        status: ReportStatus,
        resolved_by: &str,
    ) -> AppResult<Option<report::Model>> {
        use sea_orm::sea_query::Expr;

        let result = Report::update_many()
            .col_expr(report::Column::Status, Expr::value(status))
            .col_expr(
                report::Column::ResolvedBy,
                Expr::value(Some(resolved_by.to_string())),
            )
            .col_expr(report::Column::ResolvedAt, Expr::value(Some(Utc::now())))
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Reports, newest first, optionally restricted to one status.
    pub async fn find_all(&self, status: Option<ReportStatus>) -> AppResult<Vec<report::Model>> {
        let mut query = Report::find()
            .order_by_desc(report::Column::CreatedAt)
            .order_by_desc(report::Column::Id);

        if let Some(status) = status {
            query = query.filter(report::Column::Status.eq(status));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports with a given status.
    pub async fn count_by_status(&self, status: ReportStatus) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_report(id: &str, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            memory_id: "m1".to_string(),
            author_id: "p1".to_string(),
            reason: "spam".to_string(),
            description: None,
            status,
            resolved_by: None,
            created_at: Utc::now().into(),
            resolved_at: None,
        }
    }

    #[tokio::test]
    async fn test_resolve_returns_updated_row() {
        let mut resolved = create_test_report("r1", ReportStatus::Resolved);
        resolved.resolved_by = Some("admin".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[resolved.clone()]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo
            .resolve("r1", ReportStatus::Resolved, "admin")
            .await
            .unwrap();

        assert_eq!(result, Some(resolved));
    }

    #[tokio::test]
    async fn test_resolve_skips_non_pending() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo
            .resolve("r1", ReportStatus::Rejected, "admin")
            .await
            .unwrap();

        assert!(result.is_none());
    }
}
