//! Create comment, curtida and knowledge tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comment::MemoryId).string_len(32).null())
                    .col(ColumnDef::new(Comment::LegacyPersonId).string_len(32).null())
                    .col(ColumnDef::new(Comment::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::Text).text().not_null())
                    .col(
                        ColumnDef::new(Comment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Exactly one target column is set
                    .check(
                        Expr::col(Comment::MemoryId)
                            .is_not_null()
                            .and(Expr::col(Comment::LegacyPersonId).is_null())
                            .or(Expr::col(Comment::MemoryId)
                                .is_null()
                                .and(Expr::col(Comment::LegacyPersonId).is_not_null())),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_memory")
                            .from(Comment::Table, Comment::MemoryId)
                            .to(Memory::Table, Memory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_legacy_person")
                            .from(Comment::Table, Comment::LegacyPersonId)
                            .to(LegacyPerson::Table, LegacyPerson::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_author")
                            .from(Comment::Table, Comment::AuthorId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_memory_id")
                    .table(Comment::Table)
                    .col(Comment::MemoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_legacy_person_id")
                    .table(Comment::Table)
                    .col(Comment::LegacyPersonId)
                    .to_owned(),
            )
            .await?;

        // Composite primary key: one curtida per user per memory
        manager
            .create_table(
                Table::create()
                    .table(Curtida::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Curtida::MemoryId).string_len(32).not_null())
                    .col(ColumnDef::new(Curtida::ProfileId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Curtida::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Curtida::MemoryId)
                            .col(Curtida::ProfileId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_curtida_memory")
                            .from(Curtida::Table, Curtida::MemoryId)
                            .to(Memory::Table, Memory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_curtida_profile")
                            .from(Curtida::Table, Curtida::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Knowledge::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Knowledge::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Knowledge::ProfileId).string_len(32).not_null())
                    .col(ColumnDef::new(Knowledge::PostingId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Knowledge::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_knowledge_profile")
                            .from(Knowledge::Table, Knowledge::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_knowledge_posting")
                            .from(Knowledge::Table, Knowledge::PostingId)
                            .to(Posting::Table, Posting::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (profile_id, posting_id) - one acknowledgment per user per posting
        manager
            .create_index(
                Index::create()
                    .name("idx_knowledge_profile_posting")
                    .table(Knowledge::Table)
                    .col(Knowledge::ProfileId)
                    .col(Knowledge::PostingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: posting_id (for score recounts)
        manager
            .create_index(
                Index::create()
                    .name("idx_knowledge_posting_id")
                    .table(Knowledge::Table)
                    .col(Knowledge::PostingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Knowledge::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Curtida::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    MemoryId,
    LegacyPersonId,
    AuthorId,
    Text,
    CreatedAt,
}

#[derive(Iden)]
enum Curtida {
    Table,
    MemoryId,
    ProfileId,
    CreatedAt,
}

#[derive(Iden)]
enum Knowledge {
    Table,
    Id,
    ProfileId,
    PostingId,
    CreatedAt,
}

#[derive(Iden)]
enum Memory {
    Table,
    Id,
}

#[derive(Iden)]
enum LegacyPerson {
    Table,
    Id,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}

#[derive(Iden)]
enum Posting {
    Table,
    Id,
}
