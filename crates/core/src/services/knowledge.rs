//! Knowledge toggle service.

use chrono::Utc;
use guarda_common::{AppError, AppResult, IdGenerator};
use guarda_db::{
    entities::knowledge,
    repositories::{KnowledgeRepository, PostingRepository},
};
use sea_orm::Set;
use serde::Serialize;

use super::score::ScoreService;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

/// Toggle result, reflecting the state after the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeToggle {
    pub action: ToggleAction,
    pub knowledge_count: u64,
    pub user_knows: bool,
    pub score: i32,
}

/// Knowledge service for business logic.
#[derive(Clone)]
pub struct KnowledgeService {
    knowledge_repo: KnowledgeRepository,
    posting_repo: PostingRepository,
    score: ScoreService,
    id_gen: IdGenerator,
}

impl KnowledgeService {
    /// Create a new knowledge service.
    #[must_use]
    pub const fn new(
        knowledge_repo: KnowledgeRepository,
        posting_repo: PostingRepository,
        score: ScoreService,
    ) -> Self {
        Self {
            knowledge_repo,
            posting_repo,
            score,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add the acknowledgment if absent, remove it if present.
    ///
    /// The score is recounted before returning; a failed recount fails the
    /// whole toggle.
    pub async fn toggle(&self, profile_id: &str, posting_id: &str) -> AppResult<KnowledgeToggle> {
        self.posting_repo.get_by_id(posting_id).await?;

        let existing = self
            .knowledge_repo
            .find_by_profile_and_posting(profile_id, posting_id)
            .await?;

        let action = if let Some(existing) = existing {
            self.knowledge_repo.delete(&existing.id).await?;
            ToggleAction::Removed
        } else {
            let model = knowledge::ActiveModel {
                id: Set(self.id_gen.generate()),
                profile_id: Set(profile_id.to_string()),
                posting_id: Set(posting_id.to_string()),
                created_at: Set(Utc::now().into()),
            };
            match self.knowledge_repo.create(model).await {
                // A concurrent toggle added it first; the user knows either way.
                Ok(_) | Err(AppError::Conflict(_)) => ToggleAction::Added,
                Err(e) => return Err(e),
            }
        };

        let score = self.score.recompute(posting_id).await?;
        let knowledge_count = self.knowledge_repo.count_by_posting(posting_id).await?;

        tracing::debug!(
            profile_id = %profile_id,
            posting_id = %posting_id,
            action = ?action,
            score,
            "Toggled knowledge"
        );

        Ok(KnowledgeToggle {
            action,
            knowledge_count,
            user_knows: action == ToggleAction::Added,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guarda_db::entities::posting;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_toggle_on_missing_posting() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<posting::Model>::new()])
                .into_connection(),
        );
        let posting_repo = PostingRepository::new(Arc::clone(&db));
        let service = KnowledgeService::new(
            KnowledgeRepository::new(db),
            posting_repo.clone(),
            ScoreService::new(posting_repo),
        );

        let result = service.toggle("p1", "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_action_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ToggleAction::Added).unwrap(),
            "\"added\""
        );
    }
}
