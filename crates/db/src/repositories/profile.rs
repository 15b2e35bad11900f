//! Profile repository.

use std::sync::Arc;

use chrono::Utc;
use guarda_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{
    City, Profile, ProfileFavoriteCity, city, profile, profile::Role, profile_favorite_city,
};
use crate::{is_unique_violation, map_write_err};

/// Repository for profile operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by ID or fail with `NotFound`.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile: {id}")))
    }

    /// Find a profile by the auth provider's subject id.
    pub async fn find_by_external_auth_id(
        &self,
        external_auth_id: &str,
    ) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::ExternalAuthId.eq(external_auth_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a profile. A duplicate external auth id is a conflict.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "Profile already exists"))
    }

    /// Set or clear the home city.
    pub async fn set_home_city(
        &self,
        id: &str,
        city_id: Option<String>,
    ) -> AppResult<profile::Model> {
        let active = profile::ActiveModel {
            id: Set(id.to_string()),
            home_city_id: Set(city_id),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Change the role of a profile.
    pub async fn set_role(&self, id: &str, role: Role) -> AppResult<profile::Model> {
        let active = profile::ActiveModel {
            id: Set(id.to_string()),
            role: Set(role),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all profiles.
    pub async fn count(&self) -> AppResult<u64> {
        Profile::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Favorite Cities ====================

    /// Add a favorite city. Returns `false` if it was already a favorite.
    pub async fn add_favorite_city(&self, profile_id: &str, city_id: &str) -> AppResult<bool> {
        let model = profile_favorite_city::ActiveModel {
            profile_id: Set(profile_id.to_string()),
            city_id: Set(city_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        match ProfileFavoriteCity::insert(model)
            .exec_without_returning(self.db.as_ref())
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Remove a favorite city. Returns `false` if it was not a favorite.
    pub async fn remove_favorite_city(&self, profile_id: &str, city_id: &str) -> AppResult<bool> {
        let result = ProfileFavoriteCity::delete_many()
            .filter(profile_favorite_city::Column::ProfileId.eq(profile_id))
            .filter(profile_favorite_city::Column::CityId.eq(city_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Favorite cities of a profile, ordered by name.
    pub async fn find_favorite_cities(&self, profile_id: &str) -> AppResult<Vec<city::Model>> {
        City::find()
            .join(JoinType::InnerJoin, city::Relation::FavoritedBy.def())
            .filter(profile_favorite_city::Column::ProfileId.eq(profile_id))
            .order_by_asc(city::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_profile(id: &str, external: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            external_auth_id: external.to_string(),
            display_name: "Maria".to_string(),
            email: None,
            avatar_url: None,
            home_city_id: None,
            role: Role::Member,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_external_auth_id() {
        let profile = create_test_profile("p1", "auth|123");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_external_auth_id("auth|123").await.unwrap();

        assert_eq!(result.unwrap().id, "p1");
    }

    #[tokio::test]
    async fn test_remove_favorite_reports_absence() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let removed = repo.remove_favorite_city("p1", "c1").await.unwrap();

        assert!(!removed);
    }
}
