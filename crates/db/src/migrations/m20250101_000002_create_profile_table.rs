//! Create profile and favorite-city tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profile::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Profile::ExternalAuthId)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Profile::DisplayName)
                            .string_len(256)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Profile::Email).string_len(320).null())
                    .col(ColumnDef::new(Profile::AvatarUrl).string_len(1024).null())
                    .col(ColumnDef::new(Profile::HomeCityId).string_len(32).null())
                    .col(
                        ColumnDef::new(Profile::Role)
                            .string_len(16)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Profile::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_home_city")
                            .from(Profile::Table, Profile::HomeCityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProfileFavoriteCity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProfileFavoriteCity::ProfileId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfileFavoriteCity::CityId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfileFavoriteCity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProfileFavoriteCity::ProfileId)
                            .col(ProfileFavoriteCity::CityId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_favorite_city_profile")
                            .from(ProfileFavoriteCity::Table, ProfileFavoriteCity::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_favorite_city_city")
                            .from(ProfileFavoriteCity::Table, ProfileFavoriteCity::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProfileFavoriteCity::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
    ExternalAuthId,
    DisplayName,
    Email,
    AvatarUrl,
    HomeCityId,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProfileFavoriteCity {
    Table,
    ProfileId,
    CityId,
    CreatedAt,
}

#[derive(Iden)]
enum City {
    Table,
    Id,
}
