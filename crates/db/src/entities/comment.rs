//! Comment entity.
//!
//! Exactly one of `memory_id` / `legacy_person_id` is set; the service layer
//! only ever writes through a tagged target, never the raw columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(nullable, indexed)]
    pub memory_id: Option<String>,

    #[sea_orm(nullable, indexed)]
    pub legacy_person_id: Option<String>,

    #[sea_orm(indexed)]
    pub author_id: String,

    /// Stored verbatim
    #[sea_orm(column_type = "Text")]
    pub text: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::memory::Entity",
        from = "Column::MemoryId",
        to = "super::memory::Column::Id",
        on_delete = "Cascade"
    )]
    Memory,

    #[sea_orm(
        belongs_to = "super::legacy_person::Entity",
        from = "Column::LegacyPersonId",
        to = "super::legacy_person::Column::Id",
        on_delete = "Cascade"
    )]
    LegacyPerson,

    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::AuthorId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::memory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memory.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
