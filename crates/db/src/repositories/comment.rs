//! Comment repository.

use std::sync::Arc;

use guarda_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::{Comment, LegacyPerson, comment, legacy_person};

/// What a comment is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    /// A memory.
    Memory(String),
    /// A person registered before memories existed.
    LegacyPerson(String),
}

impl CommentTarget {
    /// Target id regardless of kind.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Memory(id) | Self::LegacyPerson(id) => id,
        }
    }

    /// Recover the target from a stored row.
    #[must_use]
    pub fn of(model: &comment::Model) -> Option<Self> {
        match (&model.memory_id, &model.legacy_person_id) {
            (Some(id), None) => Some(Self::Memory(id.clone())),
            (None, Some(id)) => Some(Self::LegacyPerson(id.clone())),
            _ => None,
        }
    }

    /// `(memory_id, legacy_person_id)` column values.
    #[must_use]
    pub fn columns(&self) -> (Option<String>, Option<String>) {
        match self {
            Self::Memory(id) => (Some(id.clone()), None),
            Self::LegacyPerson(id) => (None, Some(id.clone())),
        }
    }
}

/// Repository for comment operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a legacy person by ID.
    pub async fn find_legacy_person(&self, id: &str) -> AppResult<Option<legacy_person::Model>> {
        LegacyPerson::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comments on a target, oldest first.
    pub async fn find_by_target(&self, target: &CommentTarget) -> AppResult<Vec<comment::Model>> {
        let column = match target {
            CommentTarget::Memory(_) => comment::Column::MemoryId,
            CommentTarget::LegacyPerson(_) => comment::Column::LegacyPersonId,
        };

        Comment::find()
            .filter(column.eq(target.id()))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
