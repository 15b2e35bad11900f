//! Memory service: registration, ownership and city ranking.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use guarda_common::{AppError, AppResult, IdGenerator};
use guarda_db::{
    entities::{memory, memory::MemoryKind},
    repositories::{CityRepository, MemoryFilter, MemoryRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Number of top-ranked memories shown on the podium.
pub const PODIUM_SIZE: usize = 3;

/// Kind-specific fields. Only those belonging to the memory's kind are kept.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDetails {
    // PERSON
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 128))]
    pub profession: Option<String>,
    // PLACE
    #[validate(length(max = 256))]
    pub location: Option<String>,
    // DATE
    pub related_date: Option<NaiveDate>,
    // EVENT
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    // ARTWORK
    #[validate(length(max = 128))]
    pub artist: Option<String>,
    pub creation_year: Option<i32>,
    #[validate(length(max = 128))]
    pub technique: Option<String>,
    #[validate(url)]
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    #[validate(range(min = 0))]
    pub file_size: Option<i64>,
    pub file_name: Option<String>,
    // COLLECTIVE
    pub main_members: Option<String>,
    pub formation_date: Option<NaiveDate>,
    #[validate(length(max = 128))]
    pub collective_type: Option<String>,
}

impl MemoryDetails {
    /// Drop every field that does not belong to `kind`.
    #[must_use]
    pub fn retain_for(self, kind: MemoryKind) -> Self {
        let mut kept = Self::default();
        match kind {
            MemoryKind::Person => {
                kept.birth_date = self.birth_date;
                kept.profession = self.profession;
            }
            MemoryKind::Place => kept.location = self.location,
            MemoryKind::Date => kept.related_date = self.related_date,
            MemoryKind::Event => {
                kept.start_date = self.start_date;
                kept.end_date = self.end_date;
            }
            MemoryKind::Artwork => {
                kept.artist = self.artist;
                kept.creation_year = self.creation_year;
                kept.technique = self.technique;
                kept.file_url = self.file_url;
                kept.file_type = self.file_type;
                kept.file_size = self.file_size;
                kept.file_name = self.file_name;
            }
            MemoryKind::Collective => {
                kept.main_members = self.main_members;
                kept.formation_date = self.formation_date;
                kept.collective_type = self.collective_type;
            }
        }
        kept
    }

    /// Write every field into a new row.
    fn apply_all(self, model: &mut memory::ActiveModel) {
        model.birth_date = Set(self.birth_date);
        model.profession = Set(self.profession);
        model.location = Set(self.location);
        model.related_date = Set(self.related_date);
        model.start_date = Set(self.start_date);
        model.end_date = Set(self.end_date);
        model.artist = Set(self.artist);
        model.creation_year = Set(self.creation_year);
        model.technique = Set(self.technique);
        model.file_url = Set(self.file_url);
        model.file_type = Set(self.file_type);
        model.file_size = Set(self.file_size);
        model.file_name = Set(self.file_name);
        model.main_members = Set(self.main_members);
        model.formation_date = Set(self.formation_date);
        model.collective_type = Set(self.collective_type);
    }

    /// Write only the supplied fields into an update.
    fn apply_supplied(self, model: &mut memory::ActiveModel) {
        macro_rules! patch {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    model.$field = Set(Some(value));
                })*
            };
        }
        patch!(
            birth_date,
            profession,
            location,
            related_date,
            start_date,
            end_date,
            artist,
            creation_year,
            technique,
            file_url,
            file_type,
            file_size,
            file_name,
            main_members,
            formation_date,
            collective_type
        );
    }
}

/// Input for registering a memory.
///
/// Required fields are optional here so that a missing one is reported
/// before the kind is checked.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryInput {
    pub kind: Option<String>,
    #[validate(length(max = 256))]
    pub name: Option<String>,
    pub city_id: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    #[validate(length(max = 32))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(nested)]
    #[serde(flatten)]
    pub details: MemoryDetails,
}

/// Input for updating a memory. Absent fields are left alone.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemoryInput {
    /// Must match the stored kind if given.
    pub kind: Option<String>,
    #[validate(length(max = 256))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    #[validate(length(max = 32))]
    pub tags: Option<Vec<String>>,
    #[validate(nested)]
    #[serde(flatten)]
    pub details: MemoryDetails,
}

/// A memory with its live interaction counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMemory {
    pub memory: memory::Model,
    pub comment_count: u64,
    pub like_count: u64,
    pub media_count: u64,
}

impl RankedMemory {
    /// Read-time score: comments + likes + media.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.comment_count + self.like_count + self.media_count
    }
}

/// A city's memories split into podium and the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedMemories {
    pub podium: Vec<RankedMemory>,
    pub rest: Vec<RankedMemory>,
}

/// Order by comments, then likes, then media, all descending.
///
/// The sort is stable, so full ties keep the order they came in.
#[must_use]
pub fn rank(mut rows: Vec<RankedMemory>) -> RankedMemories {
    rows.sort_by(|a, b| {
        b.comment_count
            .cmp(&a.comment_count)
            .then(b.like_count.cmp(&a.like_count))
            .then(b.media_count.cmp(&a.media_count))
    });
    let rest = rows.split_off(rows.len().min(PODIUM_SIZE));
    RankedMemories { podium: rows, rest }
}

/// Parse a memory kind, rejecting anything outside the enumeration.
pub fn parse_kind(value: &str) -> AppResult<MemoryKind> {
    MemoryKind::parse(value).ok_or_else(|| AppError::Validation(format!("Invalid kind: {value}")))
}

fn required<'a>(value: Option<&'a str>, field: &str) -> AppResult<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("Missing required field: {field}")))
}

/// Memory service for business logic.
#[derive(Clone)]
pub struct MemoryService {
    memory_repo: MemoryRepository,
    city_repo: CityRepository,
    id_gen: IdGenerator,
}

impl MemoryService {
    /// Create a new memory service.
    #[must_use]
    pub const fn new(memory_repo: MemoryRepository, city_repo: CityRepository) -> Self {
        Self {
            memory_repo,
            city_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a memory.
    ///
    /// Checks run in order: required fields, kind, field limits, city.
    pub async fn create(&self, owner_id: &str, input: CreateMemoryInput) -> AppResult<memory::Model> {
        let name = required(input.name.as_deref(), "name")?.trim().to_string();
        let kind = required(input.kind.as_deref(), "kind")?;
        let city_id = required(input.city_id.as_deref(), "cityId")?.to_string();

        let kind = parse_kind(kind)?;
        input.validate()?;

        self.city_repo.get_by_id(&city_id).await?;

        let now = Utc::now();
        let mut model = memory::ActiveModel {
            id: Set(self.id_gen.generate()),
            kind: Set(kind),
            name: Set(name),
            description: Set(input.description),
            photo_url: Set(input.photo_url),
            city_id: Set(city_id),
            owner_id: Set(owner_id.to_string()),
            category: Set(input.category),
            tags: Set(json!(input.tags)),
            created_at: Set(now.into()),
            updated_at: Set(None),
            ..Default::default()
        };
        input.details.retain_for(kind).apply_all(&mut model);

        let created = self.memory_repo.create(model).await?;
        tracing::info!(memory_id = %created.id, kind = kind.as_str(), "Registered memory");
        Ok(created)
    }

    /// Update a memory. Only its owner may.
    pub async fn update(
        &self,
        profile_id: &str,
        memory_id: &str,
        input: UpdateMemoryInput,
    ) -> AppResult<memory::Model> {
        let existing = self.owned(profile_id, memory_id).await?;

        if let Some(ref kind) = input.kind {
            if parse_kind(kind)? != existing.kind {
                return Err(AppError::Validation("Kind cannot be changed".to_string()));
            }
        }
        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("Missing required field: name".to_string()));
        }
        input.validate()?;

        let mut model = memory::ActiveModel {
            id: Set(existing.id.clone()),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        if let Some(name) = input.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        if let Some(photo_url) = input.photo_url {
            model.photo_url = Set(Some(photo_url));
        }
        if let Some(category) = input.category {
            model.category = Set(Some(category));
        }
        if let Some(tags) = input.tags {
            model.tags = Set(json!(tags));
        }
        input
            .details
            .retain_for(existing.kind)
            .apply_supplied(&mut model);

        self.memory_repo.update(model).await
    }

    /// Delete a memory and, through the database, everything attached to it.
    pub async fn delete(&self, profile_id: &str, memory_id: &str) -> AppResult<()> {
        let existing = self.owned(profile_id, memory_id).await?;
        self.memory_repo.delete(&existing.id).await?;
        tracing::info!(memory_id = %memory_id, "Deleted memory");
        Ok(())
    }

    /// Get a memory with its counts.
    pub async fn get(&self, memory_id: &str) -> AppResult<RankedMemory> {
        let memory = self.memory_repo.get_by_id(memory_id).await?;
        let mut rows = self.with_counts(vec![memory]).await?;
        rows.pop()
            .ok_or_else(|| AppError::Internal("Memory lost while counting".to_string()))
    }

    /// Rank the memories of a city.
    pub async fn list(
        &self,
        city_id: Option<&str>,
        filter: &MemoryFilter,
    ) -> AppResult<RankedMemories> {
        let city_id = required(city_id, "cityId")?;
        self.city_repo.get_by_id(city_id).await?;

        let memories = self.memory_repo.find_by_city(city_id, filter).await?;
        Ok(rank(self.with_counts(memories).await?))
    }

    async fn owned(&self, profile_id: &str, memory_id: &str) -> AppResult<memory::Model> {
        let memory = self.memory_repo.get_by_id(memory_id).await?;
        if memory.owner_id != profile_id {
            return Err(AppError::Forbidden(
                "Only the owner can change this memory".to_string(),
            ));
        }
        Ok(memory)
    }

    async fn with_counts(&self, memories: Vec<memory::Model>) -> AppResult<Vec<RankedMemory>> {
        let ids: Vec<String> = memories.iter().map(|m| m.id.clone()).collect();

        let comments = self.memory_repo.count_comments_by_memory(&ids).await?;
        let likes = self.memory_repo.count_likes_by_memory(&ids).await?;
        let media = self.memory_repo.count_media_by_memory(&ids).await?;

        let count = |map: &HashMap<String, u64>, id: &str| map.get(id).copied().unwrap_or(0);

        Ok(memories
            .into_iter()
            .map(|memory| RankedMemory {
                comment_count: count(&comments, &memory.id),
                like_count: count(&likes, &memory.id),
                media_count: count(&media, &memory.id),
                memory,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_memory(id: &str, owner_id: &str) -> memory::Model {
        memory::Model {
            id: id.to_string(),
            kind: MemoryKind::Person,
            name: "Dona Zica".to_string(),
            description: None,
            photo_url: None,
            city_id: "c1".to_string(),
            owner_id: owner_id.to_string(),
            category: None,
            tags: json!([]),
            birth_date: None,
            profession: None,
            location: None,
            related_date: None,
            start_date: None,
            end_date: None,
            artist: None,
            creation_year: None,
            technique: None,
            file_url: None,
            file_type: None,
            file_size: None,
            file_name: None,
            main_members: None,
            formation_date: None,
            collective_type: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn ranked(id: &str, comments: u64, likes: u64, media: u64) -> RankedMemory {
        RankedMemory {
            memory: create_test_memory(id, "p1"),
            comment_count: comments,
            like_count: likes,
            media_count: media,
        }
    }

    fn service(db: MockDatabase) -> MemoryService {
        let conn = Arc::new(db.into_connection());
        MemoryService::new(
            MemoryRepository::new(Arc::clone(&conn)),
            CityRepository::new(conn),
        )
    }

    #[test]
    fn test_rank_comment_count_dominates() {
        let result = rank(vec![
            ranked("c", 3, 2, 8),
            ranked("b", 3, 10, 0),
            ranked("a", 5, 0, 0),
        ]);

        let order: Vec<&str> = result.podium.iter().map(|r| r.memory.id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert!(result.rest.is_empty());
    }

    #[test]
    fn test_rank_splits_podium_and_keeps_ties_stable() {
        let result = rank(vec![
            ranked("m1", 0, 0, 0),
            ranked("m2", 0, 0, 0),
            ranked("m3", 0, 0, 1),
            ranked("m4", 0, 0, 0),
            ranked("m5", 1, 0, 0),
        ]);

        let podium: Vec<&str> = result.podium.iter().map(|r| r.memory.id.as_str()).collect();
        let rest: Vec<&str> = result.rest.iter().map(|r| r.memory.id.as_str()).collect();
        assert_eq!(podium, ["m5", "m3", "m1"]);
        assert_eq!(rest, ["m2", "m4"]);
    }

    #[test]
    fn test_score_is_sum_of_counts() {
        assert_eq!(ranked("m", 2, 3, 4).score(), 9);
    }

    #[test]
    fn test_details_dropped_for_other_kinds() {
        let details = MemoryDetails {
            profession: Some("Sambista".to_string()),
            location: Some("Praça".to_string()),
            artist: Some("Someone".to_string()),
            ..Default::default()
        };

        let kept = details.retain_for(MemoryKind::Person);
        assert_eq!(kept.profession.as_deref(), Some("Sambista"));
        assert!(kept.location.is_none());
        assert!(kept.artist.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_kind_before_touching_db() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(
                "p1",
                CreateMemoryInput {
                    kind: Some("NOT_A_KIND".to_string()),
                    name: Some("Anything".to_string()),
                    city_id: Some("c1".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("Invalid kind")));
    }

    #[tokio::test]
    async fn test_create_reports_missing_field_first() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(
                "p1",
                CreateMemoryInput {
                    kind: Some("NOT_A_KIND".to_string()),
                    city_id: Some("c1".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("name")));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let memory = create_test_memory("m1", "owner");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[memory]]),
        );

        let result = service
            .update("intruder", "m1", UpdateMemoryInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_cannot_change_kind() {
        let memory = create_test_memory("m1", "owner");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[memory]]),
        );

        let result = service
            .update(
                "owner",
                "m1",
                UpdateMemoryInput {
                    kind: Some("PLACE".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_requires_city_id() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = service.list(None, &MemoryFilter::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
