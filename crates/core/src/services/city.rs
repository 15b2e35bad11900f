//! City service: slugs and lookups.

use std::collections::HashSet;

use chrono::Utc;
use guarda_common::{AppError, AppResult, IdGenerator, city_slug, slug::dedupe_slug};
use guarda_db::{
    entities::{city, state},
    repositories::CityRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Slug insert attempts before a concurrent writer is assumed to keep winning.
const SLUG_ATTEMPTS: u32 = 3;

/// Input for creating a city.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCityInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub state_id: String,
}

/// A city together with its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityWithState {
    pub city: city::Model,
    pub state: Option<state::Model>,
}

impl From<(city::Model, Option<state::Model>)> for CityWithState {
    fn from((city, state): (city::Model, Option<state::Model>)) -> Self {
        Self { city, state }
    }
}

/// City service for business logic.
#[derive(Clone)]
pub struct CityService {
    city_repo: CityRepository,
    id_gen: IdGenerator,
}

impl CityService {
    /// Create a new city service.
    #[must_use]
    pub const fn new(city_repo: CityRepository) -> Self {
        Self {
            city_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a city with a unique slug. Seed tooling only.
    pub async fn create(&self, input: CreateCityInput) -> AppResult<city::Model> {
        input.validate()?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Missing required field: name".to_string()));
        }

        let state = self
            .city_repo
            .find_state_by_id(&input.state_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("State: {}", input.state_id)))?;

        let base = city_slug(&input.name, &state.abbreviation);

        for _ in 0..SLUG_ATTEMPTS {
            let slug = self.free_slug(&base).await?;
            let model = city::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(input.name.trim().to_string()),
                state_id: Set(state.id.clone()),
                slug: Set(Some(slug.clone())),
                created_at: Set(Utc::now().into()),
            };

            match self.city_repo.create(model).await {
                Ok(created) => {
                    tracing::info!(city_id = %created.id, slug = %slug, "Created city");
                    return Ok(created);
                }
                Err(AppError::Conflict(_)) => {
                    tracing::debug!(slug = %slug, "City slug taken concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict(format!("Could not allocate a slug for {base}")))
    }

    /// Give a slug to every city that lacks one. Returns how many were set.
    pub async fn backfill_slugs(&self) -> AppResult<u64> {
        let pending = self.city_repo.find_without_slug().await?;
        let mut updated = 0;

        for (city, state) in pending {
            let abbreviation = state.as_ref().map_or("", |s| s.abbreviation.as_str());
            let base = city_slug(&city.name, abbreviation);
            let slug = self.free_slug(&base).await?;
            self.city_repo.set_slug(&city.id, &slug).await?;
            tracing::debug!(city_id = %city.id, slug = %slug, "Backfilled city slug");
            updated += 1;
        }

        if updated > 0 {
            tracing::info!(count = updated, "Backfilled city slugs");
        }
        Ok(updated)
    }

    /// Get a city by ID.
    pub async fn get(&self, id: &str) -> AppResult<city::Model> {
        self.city_repo.get_by_id(id).await
    }

    /// Get a city by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<CityWithState> {
        self.city_repo
            .find_by_slug(slug)
            .await?
            .map(CityWithState::from)
            .ok_or_else(|| AppError::NotFound(format!("City: {slug}")))
    }

    /// List cities, optionally for one state.
    pub async fn list(&self, state_id: Option<&str>) -> AppResult<Vec<CityWithState>> {
        Ok(self
            .city_repo
            .find_all(state_id)
            .await?
            .into_iter()
            .map(CityWithState::from)
            .collect())
    }

    async fn free_slug(&self, base: &str) -> AppResult<String> {
        let taken: HashSet<String> = self
            .city_repo
            .find_slugs_with_prefix(base)
            .await?
            .into_iter()
            .collect();
        Ok(dedupe_slug(base, |candidate| taken.contains(candidate)))
    }
}
