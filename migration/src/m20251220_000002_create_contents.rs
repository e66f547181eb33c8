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
                    .table(Contents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contents::Slug).string().not_null())
                    .col(ColumnDef::new(Contents::Title).string().not_null())
                    .col(ColumnDef::new(Contents::Excerpt).text().not_null())
                    .col(ColumnDef::new(Contents::Body).text().not_null())
                    .col(ColumnDef::new(Contents::Headings).json().not_null())
                    .col(ColumnDef::new(Contents::Keywords).json().not_null())
                    .col(ColumnDef::new(Contents::ThumbnailUrl).string().null())
                    .col(ColumnDef::new(Contents::SeoMeta).json().not_null())
                    .col(
                        ColumnDef::new(Contents::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Contents::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Contents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Contents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contents_slug")
                    .table(Contents::Table)
                    .col(Contents::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contents_published")
                    .table(Contents::Table)
                    .col(Contents::IsPublished)
                    .col(Contents::PublishedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Contents {
    Table,
    Id,
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
    UpdatedAt,
}
