//! City and state repository.

use std::sync::Arc;

use guarda_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{City, State, city, state};
use crate::map_write_err;

/// Repository for city operations.
#[derive(Clone)]
pub struct CityRepository {
    db: Arc<DatabaseConnection>,
}

impl CityRepository {
    /// Create a new city repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== State Operations ====================

    /// Find a state by ID.
    pub async fn find_state_by_id(&self, id: &str) -> AppResult<Option<state::Model>> {
        State::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a state. Duplicate abbreviations are a conflict.
    pub async fn create_state(&self, model: state::ActiveModel) -> AppResult<state::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "State abbreviation already exists"))
    }

    // ==================== City Operations ====================

    /// Find a city by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<city::Model>> {
        City::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a city by ID or fail with `NotFound`.
    pub async fn get_by_id(&self, id: &str) -> AppResult<city::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("City: {id}")))
    }

    /// Find a city by slug, with its state.
    pub async fn find_by_slug(
        &self,
        slug: &str,
    ) -> AppResult<Option<(city::Model, Option<state::Model>)>> {
        City::find()
            .filter(city::Column::Slug.eq(slug))
            .find_also_related(State)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List cities with their state, ordered by name.
    pub async fn find_all(
        &self,
        state_id: Option<&str>,
    ) -> AppResult<Vec<(city::Model, Option<state::Model>)>> {
        let mut query = City::find()
            .find_also_related(State)
            .order_by_asc(city::Column::Name)
            .order_by_asc(city::Column::Id);

        if let Some(state_id) = state_id {
            query = query.filter(city::Column::StateId.eq(state_id));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Cities that still have no slug, with their state.
    pub async fn find_without_slug(&self) -> AppResult<Vec<(city::Model, Option<state::Model>)>> {
        City::find()
            .filter(city::Column::Slug.is_null())
            .find_also_related(State)
            .order_by_asc(city::Column::CreatedAt)
            .order_by_asc(city::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether any city already uses this slug.
    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        let count = City::find()
            .filter(city::Column::Slug.eq(slug))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// All slugs currently in use that start with `prefix`.
    pub async fn find_slugs_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        use sea_orm::QuerySelect;

        let slugs = City::find()
            .filter(city::Column::Slug.starts_with(prefix))
            .select_only()
            .column(city::Column::Slug)
            .into_tuple::<Option<String>>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(slugs.into_iter().flatten().collect())
    }

    /// Create a city. A slug collision is a conflict.
    pub async fn create(&self, model: city::ActiveModel) -> AppResult<city::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "City slug already exists"))
    }

    /// Set the slug of a city.
    pub async fn set_slug(&self, id: &str, slug: &str) -> AppResult<()> {
        let active = city::ActiveModel {
            id: Set(id.to_string()),
            slug: Set(Some(slug.to_string())),
            ..Default::default()
        };
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "City slug already exists"))?;
        Ok(())
    }

    /// Count all cities.
    pub async fn count(&self) -> AppResult<u64> {
        City::find()
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

    fn create_test_city(id: &str, name: &str, slug: Option<&str>) -> city::Model {
        city::Model {
            id: id.to_string(),
            name: name.to_string(),
            state_id: "sp".to_string(),
            slug: slug.map(ToString::to_string),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<city::Model>::new()])
                .into_connection(),
        );

        let repo = CityRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let city = create_test_city("c1", "Campinas", Some("campinas-sp"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[city.clone()]])
                .into_connection(),
        );

        let repo = CityRepository::new(db);
        let result = repo.find_by_id("c1").await.unwrap();

        assert_eq!(result.unwrap().slug.as_deref(), Some("campinas-sp"));
    }
}
