//! Create posting table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posting::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posting::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posting::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Posting::CityId).string_len(32).not_null())
                    .col(ColumnDef::new(Posting::MemoryId).string_len(32).null())
                    .col(ColumnDef::new(Posting::ParentId).string_len(32).null())
                    .col(ColumnDef::new(Posting::PostingType).string_len(16).not_null())
                    .col(ColumnDef::new(Posting::Text).text().null())
                    .col(ColumnDef::new(Posting::Url).string_len(1024).null())
                    .col(
                        ColumnDef::new(Posting::Permalink)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Posting::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Posting::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posting_owner")
                            .from(Posting::Table, Posting::OwnerId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posting_city")
                            .from(Posting::Table, Posting::CityId)
                            .to(City::Table, City::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posting_memory")
                            .from(Posting::Table, Posting::MemoryId)
                            .to(Memory::Table, Memory::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posting_parent")
                            .from(Posting::Table, Posting::ParentId)
                            .to(Posting::Table, Posting::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (parent_id, created_at) (replies in creation order, reply counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_posting_parent_created")
                    .table(Posting::Table)
                    .col(Posting::ParentId)
                    .col(Posting::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: (city_id, score) (city ranking)
        manager
            .create_index(
                Index::create()
                    .name("idx_posting_city_score")
                    .table(Posting::Table)
                    .col(Posting::CityId)
                    .col(Posting::Score)
                    .to_owned(),
            )
            .await?;

        // Index: memory_id (media count per memory)
        manager
            .create_index(
                Index::create()
                    .name("idx_posting_memory_id")
                    .table(Posting::Table)
                    .col(Posting::MemoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posting::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Posting {
    Table,
    Id,
    OwnerId,
    CityId,
    MemoryId,
    ParentId,
    PostingType,
    Text,
    Url,
    Permalink,
    Score,
    CreatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}

#[derive(Iden)]
enum City {
    Table,
    Id,
}

#[derive(Iden)]
enum Memory {
    Table,
    Id,
}
