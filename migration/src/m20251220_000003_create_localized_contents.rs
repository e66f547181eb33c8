// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LocalizedContents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LocalizedContents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LocalizedContents::OriginalContentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LocalizedContents::LanguageCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LocalizedContents::Slug).string().not_null())
                    .col(ColumnDef::new(LocalizedContents::Title).string().not_null())
                    .col(ColumnDef::new(LocalizedContents::Excerpt).text().not_null())
                    .col(ColumnDef::new(LocalizedContents::Body).text().not_null())
                    .col(ColumnDef::new(LocalizedContents::Headings).json().not_null())
                    .col(ColumnDef::new(LocalizedContents::Keywords).json().not_null())
                    .col(ColumnDef::new(LocalizedContents::ThumbnailUrl).string().null())
                    .col(ColumnDef::new(LocalizedContents::SeoMeta).json().not_null())
                    .col(
                        ColumnDef::new(LocalizedContents::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LocalizedContents::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(LocalizedContents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_localized_contents_original")
                            .from(LocalizedContents::Table, LocalizedContents::OriginalContentId)
                            .to(Contents::Table, Contents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one translation per language
        manager
            .create_index(
                Index::create()
                    .name("idx_localized_contents_original_language")
                    .table(LocalizedContents::Table)
                    .col(LocalizedContents::OriginalContentId)
                    .col(LocalizedContents::LanguageCode)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LocalizedContents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LocalizedContents {
    Table,
    Id,
    OriginalContentId,
    LanguageCode,
    Slug,
    Title,
    Excerpt,
    Body,
    Headings,
    Keywords,
    ThumbnailUrl,
    SeoMeta,
    IsPublished,
    PublishedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Contents {
    Table,
    Id,
}
