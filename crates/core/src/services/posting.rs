//! Posting service: creation, reply threads and delete-and-reassign.

use std::sync::Arc;

use chrono::Utc;
use guarda_common::{AppError, AppResult, IdGenerator};
use guarda_db::{
    entities::{posting, posting::PostingType},
    repositories::{CityRepository, MemoryRepository, PostingRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::score::{NoOpScoreScheduler, ScoreSchedulerService};

/// Default number of insert attempts on permalink collision.
pub const DEFAULT_PERMALINK_ATTEMPTS: u32 = 5;

/// Input for creating a posting.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostingInput {
    #[serde(rename = "type")]
    pub posting_type: Option<String>,
    #[validate(length(max = 5000))]
    pub text: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    pub city_id: Option<String>,
    /// Memory this posting documents, if any.
    pub memory_id: Option<String>,
    /// Posting this one replies to, if any.
    pub parent_id: Option<String>,
}

/// Outcome of deleting a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePostingResult {
    pub deleted_id: String,
    /// Reply that took over as root, if any.
    pub promoted_root_id: Option<String>,
}

/// Posting service for business logic.
#[derive(Clone)]
pub struct PostingService {
    posting_repo: PostingRepository,
    city_repo: CityRepository,
    memory_repo: MemoryRepository,
    scheduler: ScoreSchedulerService,
    permalink_attempts: u32,
    id_gen: IdGenerator,
}

impl PostingService {
    /// Create a new posting service. Best-effort recounts are dropped until
    /// a scheduler is set.
    #[must_use]
    pub fn new(
        posting_repo: PostingRepository,
        city_repo: CityRepository,
        memory_repo: MemoryRepository,
    ) -> Self {
        Self {
            posting_repo,
            city_repo,
            memory_repo,
            scheduler: Arc::new(NoOpScoreScheduler),
            permalink_attempts: DEFAULT_PERMALINK_ATTEMPTS,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the scheduler for best-effort parent score recounts.
    pub fn set_score_scheduler(&mut self, scheduler: ScoreSchedulerService) {
        self.scheduler = scheduler;
    }

    /// Set how many permalinks to try before giving up.
    pub fn set_permalink_attempts(&mut self, attempts: u32) {
        self.permalink_attempts = attempts.max(1);
    }

    /// Create a posting or a reply.
    pub async fn create(
        &self,
        owner_id: &str,
        mut input: CreatePostingInput,
    ) -> AppResult<posting::Model> {
        let posting_type = input
            .posting_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Validation("Missing required field: type".to_string()))?;
        let city_id = input
            .city_id
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Validation("Missing required field: cityId".to_string()))?;

        let posting_type = PostingType::parse(posting_type)
            .ok_or_else(|| AppError::Validation(format!("Invalid type: {posting_type}")))?;

        input.text = input.text.take().filter(|t| !t.is_empty());
        input.url = input.url.take().filter(|u| !u.is_empty());
        if input.text.is_none() && input.url.is_none() {
            return Err(AppError::Validation("No content provided".to_string()));
        }
        input.validate()?;

        self.city_repo.get_by_id(&city_id).await?;
        if let Some(ref memory_id) = input.memory_id {
            self.memory_repo.get_by_id(memory_id).await?;
        }
        if let Some(ref parent_id) = input.parent_id {
            self.posting_repo.get_by_id(parent_id).await?;
        }

        let id = self.id_gen.generate();
        let mut created = None;

        for attempt in 1..=self.permalink_attempts {
            let permalink = self.id_gen.generate_permalink();
            let model = posting::ActiveModel {
                id: Set(id.clone()),
                owner_id: Set(owner_id.to_string()),
                city_id: Set(city_id.clone()),
                memory_id: Set(input.memory_id.clone()),
                parent_id: Set(input.parent_id.clone()),
                posting_type: Set(posting_type),
                text: Set(input.text.clone()),
                url: Set(input.url.clone()),
                permalink: Set(permalink.clone()),
                score: Set(0),
                created_at: Set(Utc::now().into()),
            };

            match self.posting_repo.create(model).await {
                Ok(posting) => {
                    created = Some(posting);
                    break;
                }
                Err(AppError::Conflict(_)) => {
                    tracing::warn!(permalink = %permalink, attempt, "Permalink collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        let posting = created.ok_or_else(|| {
            AppError::Conflict("Could not allocate a unique permalink".to_string())
        })?;

        if let Some(ref parent_id) = posting.parent_id {
            tracing::debug!(posting_id = %posting.id, parent_id = %parent_id, "Created reply");
            self.schedule_recount(parent_id).await;
        }

        Ok(posting)
    }

    /// Delete a posting. Only its owner may.
    ///
    /// A root with replies hands over to its oldest reply. A reply is simply
    /// removed and its parent's score recounted in the background.
    pub async fn delete(
        &self,
        requester_id: &str,
        posting_id: &str,
    ) -> AppResult<DeletePostingResult> {
        let posting = self.posting_repo.get_by_id(posting_id).await?;
        if posting.owner_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the owner can delete this posting".to_string(),
            ));
        }

        match posting.parent_id {
            None => {
                let deleted = self.posting_repo.delete_with_reassignment(posting_id).await?;
                if let Some(ref promoted) = deleted.promoted_root_id {
                    tracing::info!(
                        posting_id = %posting_id,
                        promoted_root_id = %promoted,
                        reparented = deleted.reparented,
                        "Deleted root posting and promoted oldest reply"
                    );
                }
                Ok(DeletePostingResult {
                    deleted_id: posting.id,
                    promoted_root_id: deleted.promoted_root_id,
                })
            }
            Some(ref parent_id) => {
                self.posting_repo.delete(posting_id).await?;
                self.schedule_recount(parent_id).await;
                Ok(DeletePostingResult {
                    deleted_id: posting.id,
                    promoted_root_id: None,
                })
            }
        }
    }

    /// Get a posting by ID.
    pub async fn get(&self, id: &str) -> AppResult<posting::Model> {
        self.posting_repo.get_by_id(id).await
    }

    /// Get a posting by permalink.
    pub async fn get_by_permalink(&self, permalink: &str) -> AppResult<posting::Model> {
        self.posting_repo
            .find_by_permalink(permalink)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Posting: {permalink}")))
    }

    /// Direct replies of a posting, oldest first.
    pub async fn list_replies(&self, posting_id: &str) -> AppResult<Vec<posting::Model>> {
        self.posting_repo.get_by_id(posting_id).await?;
        self.posting_repo.find_replies(posting_id).await
    }

    /// Root postings of a city, best scored first.
    pub async fn list_by_city(&self, city_id: &str) -> AppResult<Vec<posting::Model>> {
        self.city_repo.get_by_id(city_id).await?;
        self.posting_repo.find_roots_by_city(city_id).await
    }

    async fn schedule_recount(&self, posting_id: &str) {
        if let Err(e) = self.scheduler.schedule(posting_id).await {
            tracing::warn!(error = %e, posting_id = %posting_id, "Failed to schedule score recount");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_posting(id: &str, owner_id: &str) -> posting::Model {
        posting::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            city_id: "c1".to_string(),
            memory_id: None,
            parent_id: None,
            posting_type: PostingType::Text,
            text: Some("hello".to_string()),
            url: None,
            permalink: "1700000000000-abc123".to_string(),
            score: 0,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> PostingService {
        let conn = Arc::new(db.into_connection());
        PostingService::new(
            PostingRepository::new(Arc::clone(&conn)),
            CityRepository::new(Arc::clone(&conn)),
            MemoryRepository::new(conn),
        )
    }

    #[tokio::test]
    async fn test_create_without_content() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(
                "p1",
                CreatePostingInput {
                    posting_type: Some("text".to_string()),
                    text: Some(String::new()),
                    city_id: Some("c1".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "No content provided"));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_type() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(
                "p1",
                CreatePostingInput {
                    posting_type: Some("gif".to_string()),
                    text: Some("hi".to_string()),
                    city_id: Some("c1".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let posting = create_test_posting("post1", "owner");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[posting]]),
        );

        let result = service.delete("intruder", "post1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_by_permalink_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<posting::Model>::new()]),
        );

        let result = service.get_by_permalink("nope").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
