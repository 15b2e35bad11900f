//! Memory repository.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use guarda_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func, LikeExpr},
};

use crate::entities::{
    Comment, Curtida, Memory, Posting, comment, curtida, memory, memory::MemoryKind, posting,
};

/// Optional filters for listing the memories of a city.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Exact kind.
    pub kind: Option<MemoryKind>,
    /// Exact category.
    pub category: Option<String>,
    /// Case-insensitive substring of the profession.
    pub profession: Option<String>,
    /// Inclusive lower bound on the kind's date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the kind's date.
    pub date_to: Option<NaiveDate>,
}

const LIKE_ESCAPE: char = '!';

/// Lowercased substring pattern with `%` and `_` matched literally.
fn contains_pattern(needle: &str) -> LikeExpr {
    let mut pattern = String::from("%");
    for ch in needle.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

impl MemoryFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();

        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            cond = cond.add(
                Expr::expr(Func::lower(Expr::col(memory::Column::Name)))
                    .like(contains_pattern(search)),
            );
        }
        if let Some(kind) = self.kind {
            cond = cond.add(memory::Column::Kind.eq(kind));
        }
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            cond = cond.add(memory::Column::Category.eq(category));
        }
        if let Some(profession) = self.profession.as_deref().filter(|s| !s.trim().is_empty()) {
            cond = cond.add(
                Expr::expr(Func::lower(Expr::col(memory::Column::Profession)))
                    .like(contains_pattern(profession)),
            );
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let mut any_date = Condition::any();
            for column in [
                memory::Column::BirthDate,
                memory::Column::RelatedDate,
                memory::Column::StartDate,
                memory::Column::FormationDate,
            ] {
                let mut in_range = Condition::all().add(column.is_not_null());
                if let Some(from) = self.date_from {
                    in_range = in_range.add(column.gte(from));
                }
                if let Some(to) = self.date_to {
                    in_range = in_range.add(column.lte(to));
                }
                any_date = any_date.add(in_range);
            }
            cond = cond.add(any_date);
        }

        cond
    }
}

/// Repository for memory operations.
#[derive(Clone)]
pub struct MemoryRepository {
    db: Arc<DatabaseConnection>,
}

impl MemoryRepository {
    /// Create a new memory repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a memory by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<memory::Model>> {
        Memory::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a memory by ID or fail with `NotFound`.
    pub async fn get_by_id(&self, id: &str) -> AppResult<memory::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Memory: {id}")))
    }

    /// Create a new memory.
    pub async fn create(&self, model: memory::ActiveModel) -> AppResult<memory::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a memory.
    pub async fn update(&self, model: memory::ActiveModel) -> AppResult<memory::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a memory. Interactions cascade in the database.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Memory::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Memories of a city matching the filter, newest first.
    pub async fn find_by_city(
        &self,
        city_id: &str,
        filter: &MemoryFilter,
    ) -> AppResult<Vec<memory::Model>> {
        Memory::find()
            .filter(memory::Column::CityId.eq(city_id))
            .filter(filter.condition())
            .order_by_desc(memory::Column::CreatedAt)
            .order_by_desc(memory::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all memories.
    pub async fn count(&self) -> AppResult<u64> {
        Memory::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Aggregates ====================

    /// Comment count per memory, for the given memory ids.
    pub async fn count_comments_by_memory(
        &self,
        memory_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if memory_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Comment::find()
            .select_only()
            .column(comment::Column::MemoryId)
            .column_as(Expr::col(comment::Column::Id).count(), "count")
            .filter(comment::Column::MemoryId.is_in(memory_ids.iter().cloned()))
            .group_by(comment::Column::MemoryId)
            .into_tuple::<(Option<String>, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, count)| id.map(|id| (id, count.max(0) as u64)))
            .collect())
    }

    /// Like count per memory, for the given memory ids.
    pub async fn count_likes_by_memory(
        &self,
        memory_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if memory_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Curtida::find()
            .select_only()
            .column(curtida::Column::MemoryId)
            .column_as(Expr::col(curtida::Column::ProfileId).count(), "count")
            .filter(curtida::Column::MemoryId.is_in(memory_ids.iter().cloned()))
            .group_by(curtida::Column::MemoryId)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }

    /// Attached posting (media) count per memory, for the given memory ids.
    pub async fn count_media_by_memory(
        &self,
        memory_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if memory_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Posting::find()
            .select_only()
            .column(posting::Column::MemoryId)
            .column_as(Expr::col(posting::Column::Id).count(), "count")
            .filter(posting::Column::MemoryId.is_in(memory_ids.iter().cloned()))
            .group_by(posting::Column::MemoryId)
            .into_tuple::<(Option<String>, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, count)| id.map(|id| (id, count.max(0) as u64)))
            .collect())
    }
}
