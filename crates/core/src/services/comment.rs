//! Comment service.

use chrono::Utc;
use guarda_common::{AppError, AppResult, IdGenerator};
use guarda_db::{
    entities::comment,
    repositories::{CommentRepository, MemoryRepository},
};
use sea_orm::Set;

pub use guarda_db::repositories::CommentTarget;

/// Build a target from the two optional ids a client may send.
pub fn target_from_ids(
    memory_id: Option<String>,
    legacy_person_id: Option<String>,
) -> AppResult<CommentTarget> {
    match (memory_id, legacy_person_id) {
        (Some(id), None) => Ok(CommentTarget::Memory(id)),
        (None, Some(id)) => Ok(CommentTarget::LegacyPerson(id)),
        (None, None) => Err(AppError::Validation(
            "Missing required field: memoryId".to_string(),
        )),
        (Some(_), Some(_)) => Err(AppError::Validation(
            "Only one of memoryId and legacyPersonId may be set".to_string(),
        )),
    }
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    memory_repo: MemoryRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, memory_repo: MemoryRepository) -> Self {
        Self {
            comment_repo,
            memory_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a target. The text is stored exactly as given.
    pub async fn create(
        &self,
        author_id: &str,
        target: CommentTarget,
        text: String,
    ) -> AppResult<comment::Model> {
        self.ensure_target_exists(&target).await?;

        let (memory_id, legacy_person_id) = target.columns();
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            memory_id: Set(memory_id),
            legacy_person_id: Set(legacy_person_id),
            author_id: Set(author_id.to_string()),
            text: Set(text),
            created_at: Set(Utc::now().into()),
        };

        let created = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %created.id, target = %target.id(), "Created comment");
        Ok(created)
    }

    /// Comments on a target, oldest first.
    pub async fn list(&self, target: &CommentTarget) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_target(target).await
    }

    /// Delete a comment. Only its author may.
    pub async fn delete(&self, author_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment: {comment_id}")))?;

        if comment.author_id != author_id {
            return Err(AppError::Forbidden(
                "Only the author can delete this comment".to_string(),
            ));
        }

        self.comment_repo.delete(comment_id).await
    }

    async fn ensure_target_exists(&self, target: &CommentTarget) -> AppResult<()> {
        match target {
            CommentTarget::Memory(id) => {
                self.memory_repo.get_by_id(id).await?;
            }
            CommentTarget::LegacyPerson(id) => {
                self.comment_repo
                    .find_legacy_person(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Legacy person: {id}")))?;
            }
        }
        Ok(())
    }
}
