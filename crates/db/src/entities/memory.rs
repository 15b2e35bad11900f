//! Memory entity: a registered person, place, date, event, artwork or collective.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryKind {
    #[sea_orm(string_value = "PERSON")]
    Person,
    #[sea_orm(string_value = "PLACE")]
    Place,
    #[sea_orm(string_value = "DATE")]
    Date,
    #[sea_orm(string_value = "EVENT")]
    Event,
    #[sea_orm(string_value = "ARTWORK")]
    Artwork,
    #[sea_orm(string_value = "COLLECTIVE")]
    Collective,
}

impl MemoryKind {
    /// Parse the wire representation (`"PERSON"`, `"PLACE"`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PERSON" => Some(Self::Person),
            "PLACE" => Some(Self::Place),
            "DATE" => Some(Self::Date),
            "EVENT" => Some(Self::Event),
            "ARTWORK" => Some(Self::Artwork),
            "COLLECTIVE" => Some(Self::Collective),
            _ => None,
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Place => "PLACE",
            Self::Date => "DATE",
            Self::Event => "EVENT",
            Self::Artwork => "ARTWORK",
            Self::Collective => "COLLECTIVE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub kind: MemoryKind,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(nullable)]
    pub photo_url: Option<String>,

    #[sea_orm(indexed)]
    pub city_id: String,

    #[sea_orm(indexed)]
    pub owner_id: String,

    #[sea_orm(nullable)]
    pub category: Option<String>,

    /// Free-form tags (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    // PERSON
    #[sea_orm(nullable)]
    pub birth_date: Option<Date>,
    #[sea_orm(nullable)]
    pub profession: Option<String>,

    // PLACE
    #[sea_orm(nullable)]
    pub location: Option<String>,

    // DATE
    #[sea_orm(nullable)]
    pub related_date: Option<Date>,

    // EVENT
    #[sea_orm(nullable)]
    pub start_date: Option<Date>,
    #[sea_orm(nullable)]
    pub end_date: Option<Date>,

    // ARTWORK
    #[sea_orm(nullable)]
    pub artist: Option<String>,
    #[sea_orm(nullable)]
    pub creation_year: Option<i32>,
    #[sea_orm(nullable)]
    pub technique: Option<String>,
    #[sea_orm(nullable)]
    pub file_url: Option<String>,
    #[sea_orm(nullable)]
    pub file_type: Option<String>,
    #[sea_orm(nullable)]
    pub file_size: Option<i64>,
    #[sea_orm(nullable)]
    pub file_name: Option<String>,

    // COLLECTIVE
    #[sea_orm(column_type = "Text", nullable)]
    pub main_members: Option<String>,
    #[sea_orm(nullable)]
    pub formation_date: Option<Date>,
    #[sea_orm(nullable)]
    pub collective_type: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::city::Entity",
        from = "Column::CityId",
        to = "super::city::Column::Id"
    )]
    City,

    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::OwnerId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,

    #[sea_orm(has_many = "super::curtida::Entity")]
    Curtida,

    #[sea_orm(has_many = "super::posting::Entity")]
    Posting,
}

impl Related<super::city::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::City.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::curtida::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Curtida.def()
    }
}

impl Related<super::posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
