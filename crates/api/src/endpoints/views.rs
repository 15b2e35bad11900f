//! Response shapes shared by several endpoints.

use guarda_core::{CityWithState, RankedMemory};
use guarda_db::entities::{
    city, comment,
    memory::{self, MemoryKind},
    posting::{self, PostingType},
    profile::{self, Role},
    report::{self, ReportStatus},
    state,
};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub home_city_id: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl From<profile::Model> for ProfileView {
    fn from(p: profile::Model) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name,
            email: p.email,
            avatar_url: p.avatar_url,
            home_city_id: p.home_city_id,
            role: p.role,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
}

impl From<state::Model> for StateView {
    fn from(s: state::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            abbreviation: s.abbreviation,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityView {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
    pub state_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateView>,
}

impl From<city::Model> for CityView {
    fn from(c: city::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            state_id: c.state_id,
            state: None,
        }
    }
}

impl From<CityWithState> for CityView {
    fn from(row: CityWithState) -> Self {
        Self {
            state: row.state.map(StateView::from),
            ..Self::from(row.city)
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryView {
    pub id: String,
    pub kind: MemoryKind,
    pub name: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub city_id: String,
    pub owner_id: String,
    pub category: Option<String>,
    pub tags: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_members: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collective_type: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<memory::Model> for MemoryView {
    fn from(m: memory::Model) -> Self {
        let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string());
        Self {
            id: m.id,
            kind: m.kind,
            name: m.name,
            description: m.description,
            photo_url: m.photo_url,
            city_id: m.city_id,
            owner_id: m.owner_id,
            category: m.category,
            tags: m.tags,
            birth_date: date(m.birth_date),
            profession: m.profession,
            location: m.location,
            related_date: date(m.related_date),
            start_date: date(m.start_date),
            end_date: date(m.end_date),
            artist: m.artist,
            creation_year: m.creation_year,
            technique: m.technique,
            file_url: m.file_url,
            file_type: m.file_type,
            file_size: m.file_size,
            file_name: m.file_name,
            main_members: m.main_members,
            formation_date: date(m.formation_date),
            collective_type: m.collective_type,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A memory with its live counts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMemoryView {
    #[serde(flatten)]
    pub memory: MemoryView,
    pub comment_count: u64,
    pub like_count: u64,
    pub media_count: u64,
    pub score: u64,
}

impl From<RankedMemory> for RankedMemoryView {
    fn from(row: RankedMemory) -> Self {
        let score = row.score();
        Self {
            memory: row.memory.into(),
            comment_count: row.comment_count,
            like_count: row.like_count,
            media_count: row.media_count,
            score,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingView {
    pub id: String,
    #[serde(rename = "type")]
    pub posting_type: PostingType,
    pub text: Option<String>,
    pub url: Option<String>,
    pub permalink: String,
    pub score: i32,
    pub owner_id: String,
    pub city_id: String,
    pub memory_id: Option<String>,
    pub parent_id: Option<String>,
    pub created_at: String,
}

impl From<posting::Model> for PostingView {
    fn from(p: posting::Model) -> Self {
        Self {
            id: p.id,
            posting_type: p.posting_type,
            text: p.text,
            url: p.url,
            permalink: p.permalink,
            score: p.score,
            owner_id: p.owner_id,
            city_id: p.city_id,
            memory_id: p.memory_id,
            parent_id: p.parent_id,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub memory_id: Option<String>,
    pub legacy_person_id: Option<String>,
    pub author_id: String,
    pub text: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentView {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            memory_id: c.memory_id,
            legacy_person_id: c.legacy_person_id,
            author_id: c.author_id,
            text: c.text,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: String,
    pub memory_id: String,
    pub author_id: String,
    pub reason: String,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub resolved_by: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

impl From<report::Model> for ReportView {
    fn from(r: report::Model) -> Self {
        Self {
            id: r.id,
            memory_id: r.memory_id,
            author_id: r.author_id,
            reason: r.reason,
            description: r.description,
            status: r.status,
            resolved_by: r.resolved_by,
            created_at: r.created_at.to_rfc3339(),
            resolved_at: r.resolved_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// `{id}` request body.
#[derive(Debug, serde::Deserialize)]
pub struct IdRequest {
    pub id: String,
}
