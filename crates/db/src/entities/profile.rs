//! Profile entity (internal user record).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Privilege level of a profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "member")]
    #[default]
    Member,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Stable subject id issued by the auth provider
    #[sea_orm(unique)]
    pub external_auth_id: String,

    pub display_name: String,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// NULL until onboarding picks a city
    #[sea_orm(nullable)]
    pub home_city_id: Option<String>,

    pub role: Role,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether this profile may moderate reports and read stats.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::city::Entity",
        from = "Column::HomeCityId",
        to = "super::city::Column::Id",
        on_delete = "SetNull"
    )]
    HomeCity,
}

impl Related<super::city::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HomeCity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
