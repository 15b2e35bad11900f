//! Profile service: identity resolution, onboarding and roles.

use chrono::Utc;
use guarda_common::{AppError, AppResult, IdGenerator};
use guarda_db::{
    entities::{city, profile, profile::Role},
    repositories::{CityRepository, ProfileRepository},
};
use sea_orm::Set;

/// An identity already verified by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable subject id.
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    city_repo: CityRepository,
    id_gen: IdGenerator,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository, city_repo: CityRepository) -> Self {
        Self {
            profile_repo,
            city_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Map a principal to its profile, creating the profile on first use.
    ///
    /// Two first requests racing for the same subject both end up with the
    /// row that won the unique constraint.
    pub async fn resolve(&self, principal: &Principal) -> AppResult<profile::Model> {
        if let Some(existing) = self
            .profile_repo
            .find_by_external_auth_id(&principal.subject)
            .await?
        {
            return Ok(existing);
        }

        let model = profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            external_auth_id: Set(principal.subject.clone()),
            display_name: Set(principal.name.clone().unwrap_or_default()),
            email: Set(principal.email.clone()),
            avatar_url: Set(principal.avatar_url.clone()),
            home_city_id: Set(None),
            role: Set(Role::Member),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        match self.profile_repo.create(model).await {
            Ok(created) => {
                tracing::info!(profile_id = %created.id, "Created profile on first use");
                Ok(created)
            }
            Err(AppError::Conflict(_)) => self
                .profile_repo
                .find_by_external_auth_id(&principal.subject)
                .await?
                .ok_or_else(|| {
                    AppError::Internal("Profile vanished after unique violation".to_string())
                }),
            Err(e) => Err(e),
        }
    }

    /// Get a profile by ID.
    pub async fn get(&self, id: &str) -> AppResult<profile::Model> {
        self.profile_repo.get_by_id(id).await
    }

    /// Fail with `Forbidden` unless the profile is an admin.
    pub async fn require_admin(&self, id: &str) -> AppResult<profile::Model> {
        let profile = self.profile_repo.get_by_id(id).await?;
        if !profile.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(profile)
    }

    /// Set the home city, or clear it with `None`.
    pub async fn set_home_city(
        &self,
        profile_id: &str,
        city_id: Option<String>,
    ) -> AppResult<profile::Model> {
        if let Some(ref city_id) = city_id {
            self.city_repo.get_by_id(city_id).await?;
        }
        self.profile_repo.set_home_city(profile_id, city_id).await
    }

    /// Add a favorite city. Adding one twice is a no-op.
    pub async fn add_favorite_city(&self, profile_id: &str, city_id: &str) -> AppResult<()> {
        self.city_repo.get_by_id(city_id).await?;
        let added = self
            .profile_repo
            .add_favorite_city(profile_id, city_id)
            .await?;
        tracing::debug!(profile_id = %profile_id, city_id = %city_id, added, "Favorite city added");
        Ok(())
    }

    /// Remove a favorite city. Removing an absent one is a no-op.
    pub async fn remove_favorite_city(&self, profile_id: &str, city_id: &str) -> AppResult<()> {
        self.profile_repo
            .remove_favorite_city(profile_id, city_id)
            .await?;
        Ok(())
    }

    /// Favorite cities, ordered by name.
    pub async fn list_favorite_cities(&self, profile_id: &str) -> AppResult<Vec<city::Model>> {
        self.profile_repo.find_favorite_cities(profile_id).await
    }

    /// Change someone's role. Only admins may do this.
    pub async fn set_role(
        &self,
        admin_id: &str,
        target_id: &str,
        role: Role,
    ) -> AppResult<profile::Model> {
        self.require_admin(admin_id).await?;
        self.profile_repo.get_by_id(target_id).await?;

        let updated = self.profile_repo.set_role(target_id, role).await?;
        tracing::info!(admin_id = %admin_id, target_id = %target_id, role = ?role, "Role changed");
        Ok(updated)
    }
}

/// Parse a role name (`member`, `admin`).
pub fn parse_role(value: &str) -> AppResult<Role> {
    match value {
        "member" => Ok(Role::Member),
        "admin" => Ok(Role::Admin),
        other => Err(AppError::Validation(format!("Invalid role: {other}"))),
    }
}
