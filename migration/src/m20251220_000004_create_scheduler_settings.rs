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
                    .table(SchedulerSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SchedulerSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SchedulerSettings::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SchedulerSettings::ItemsPerRun)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(ColumnDef::new(SchedulerSettings::LastRunAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(SchedulerSettings::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SchedulerSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SchedulerSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SchedulerSettings {
    Table,
    Id,
    Enabled,
    ItemsPerRun,
    LastRunAt,
    Version,
    UpdatedAt,
}
