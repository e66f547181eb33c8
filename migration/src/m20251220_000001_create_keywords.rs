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
                    .table(Keywords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Keywords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Keywords::Text).string().not_null())
                    .col(ColumnDef::new(Keywords::NormalizedText).string().not_null())
                    .col(ColumnDef::new(Keywords::SearchIntent).string().null())
                    .col(
                        ColumnDef::new(Keywords::EstimatedValue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Keywords::Priority).integer().not_null().default(2))
                    .col(ColumnDef::new(Keywords::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Keywords::RelatedTerms).json().not_null())
                    .col(ColumnDef::new(Keywords::ResultContentId).uuid().null())
                    .col(ColumnDef::new(Keywords::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(Keywords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Keywords::GenerationStartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Keywords::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Keywords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Dedup key for insert-if-absent
        manager
            .create_index(
                Index::create()
                    .name("idx_keywords_normalized_text")
                    .table(Keywords::Table)
                    .col(Keywords::NormalizedText)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_keywords_status_priority")
                    .table(Keywords::Table)
                    .col(Keywords::Status)
                    .col(Keywords::Priority)
                    .col(Keywords::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Keywords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Keywords {
    Table,
    Id,
    Text,
    NormalizedText,
    SearchIntent,
    EstimatedValue,
    Priority,
    Status,
    RelatedTerms,
    ResultContentId,
    ErrorMessage,
    CreatedAt,
    GenerationStartedAt,
    PublishedAt,
    UpdatedAt,
}
