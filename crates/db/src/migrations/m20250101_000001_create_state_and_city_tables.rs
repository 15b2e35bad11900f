//! Create state and city tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(State::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(State::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(State::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(State::Abbreviation)
                            .string_len(2)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(City::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(City::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(City::Name).string_len(128).not_null())
                    .col(ColumnDef::new(City::StateId).string_len(32).not_null())
                    .col(ColumnDef::new(City::Slug).string_len(160).null().unique_key())
                    .col(
                        ColumnDef::new(City::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_city_state")
                            .from(City::Table, City::StateId)
                            .to(State::Table, State::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: state_id (for listing cities of a state)
        manager
            .create_index(
                Index::create()
                    .name("idx_city_state_id")
                    .table(City::Table)
                    .col(City::StateId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(City::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(State::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum State {
    Table,
    Id,
    Name,
    Abbreviation,
}

#[derive(Iden)]
enum City {
    Table,
    Id,
    Name,
    StateId,
    Slug,
    CreatedAt,
}
