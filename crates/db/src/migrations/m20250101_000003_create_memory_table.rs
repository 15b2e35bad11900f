//! Create memory and legacy person tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LegacyPerson::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LegacyPerson::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LegacyPerson::Name).string_len(256).not_null())
                    .col(ColumnDef::new(LegacyPerson::CityId).string_len(32).not_null())
                    .col(ColumnDef::new(LegacyPerson::OwnerId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(LegacyPerson::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_legacy_person_city")
                            .from(LegacyPerson::Table, LegacyPerson::CityId)
                            .to(City::Table, City::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_legacy_person_owner")
                            .from(LegacyPerson::Table, LegacyPerson::OwnerId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Memory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Memory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Memory::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Memory::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Memory::Description).text().null())
                    .col(ColumnDef::new(Memory::PhotoUrl).string_len(1024).null())
                    .col(ColumnDef::new(Memory::CityId).string_len(32).not_null())
                    .col(ColumnDef::new(Memory::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Memory::Category).string_len(128).null())
                    .col(
                        ColumnDef::new(Memory::Tags)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Memory::BirthDate).date().null())
                    .col(ColumnDef::new(Memory::Profession).string_len(128).null())
                    .col(ColumnDef::new(Memory::Location).string_len(512).null())
                    .col(ColumnDef::new(Memory::RelatedDate).date().null())
                    .col(ColumnDef::new(Memory::StartDate).date().null())
                    .col(ColumnDef::new(Memory::EndDate).date().null())
                    .col(ColumnDef::new(Memory::Artist).string_len(256).null())
                    .col(ColumnDef::new(Memory::CreationYear).integer().null())
                    .col(ColumnDef::new(Memory::Technique).string_len(256).null())
                    .col(ColumnDef::new(Memory::FileUrl).string_len(1024).null())
                    .col(ColumnDef::new(Memory::FileType).string_len(128).null())
                    .col(ColumnDef::new(Memory::FileSize).big_integer().null())
                    .col(ColumnDef::new(Memory::FileName).string_len(512).null())
                    .col(ColumnDef::new(Memory::MainMembers).text().null())
                    .col(ColumnDef::new(Memory::FormationDate).date().null())
                    .col(ColumnDef::new(Memory::CollectiveType).string_len(128).null())
                    .col(
                        ColumnDef::new(Memory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Memory::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memory_city")
                            .from(Memory::Table, Memory::CityId)
                            .to(City::Table, City::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memory_owner")
                            .from(Memory::Table, Memory::OwnerId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (city_id, kind) (for the city listing with a kind filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_memory_city_kind")
                    .table(Memory::Table)
                    .col(Memory::CityId)
                    .col(Memory::Kind)
                    .to_owned(),
            )
            .await?;

        // Index: owner_id (for listing a user's memories)
        manager
            .create_index(
                Index::create()
                    .name("idx_memory_owner_id")
                    .table(Memory::Table)
                    .col(Memory::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Memory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LegacyPerson::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Memory {
    Table,
    Id,
    Kind,
    Name,
    Description,
    PhotoUrl,
    CityId,
    OwnerId,
    Category,
    Tags,
    BirthDate,
    Profession,
    Location,
    RelatedDate,
    StartDate,
    EndDate,
    Artist,
    CreationYear,
    Technique,
    FileUrl,
    FileType,
    FileSize,
    FileName,
    MainMembers,
    FormationDate,
    CollectiveType,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LegacyPerson {
    Table,
    Id,
    Name,
    CityId,
    OwnerId,
    CreatedAt,
}

#[derive(Iden)]
enum City {
    Table,
    Id,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}
