// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::domain::models::scheduler::SchedulerSettings;
use crate::domain::repositories::scheduler_settings_repository::SchedulerSettingsRepository;
use crate::infrastructure::database::entities::scheduler_settings as settings_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;

/// 单行设置的固定主键
const SETTINGS_ROW_ID: i32 = 1;

/// 调度器设置仓库实现
#[derive(Clone)]
pub struct SchedulerSettingsRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl SchedulerSettingsRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<settings_entity::Model> for SchedulerSettings {
    fn from(model: settings_entity::Model) -> Self {
        Self {
            enabled: model.enabled,
            items_per_run: model.items_per_run.max(0) as u32,
            last_run_at: model.last_run_at,
            version: model.version,
        }
    }
}

#[async_trait]
impl SchedulerSettingsRepository for SchedulerSettingsRepositoryImpl {
    async fn load_or_init(&self, defaults: &SchedulerSettings) -> Result<SchedulerSettings, RepositoryError> {
        if let Some(model) = settings_entity::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(self.db.as_ref())
            .await?
        {
            return Ok(model.into());
        }

        let model = settings_entity::ActiveModel {
            id: Set(SETTINGS_ROW_ID),
            enabled: Set(defaults.enabled),
            items_per_run: Set(defaults.items_per_run as i32),
            last_run_at: Set(defaults.last_run_at),
            version: Set(0),
            updated_at: Set(Utc::now().into()),
        };
        // a concurrent initializer may win, in which case its row is used
        settings_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(settings_entity::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        settings_entity::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(self.db.as_ref())
            .await?
            .map(Into::into)
            .ok_or(RepositoryError::NotFound)
    }

    async fn compare_and_set(&self, settings: &SchedulerSettings) -> Result<bool, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();

        let result = settings_entity::Entity::update_many()
            .col_expr(settings_entity::Column::Enabled, Expr::value(settings.enabled))
            .col_expr(
                settings_entity::Column::ItemsPerRun,
                Expr::value(settings.items_per_run as i32),
            )
            .col_expr(
                settings_entity::Column::LastRunAt,
                Expr::value(settings.last_run_at),
            )
            .col_expr(
                settings_entity::Column::Version,
                Expr::value(settings.version + 1),
            )
            .col_expr(settings_entity::Column::UpdatedAt, Expr::value(now))
            .filter(settings_entity::Column::Id.eq(SETTINGS_ROW_ID))
            .filter(settings_entity::Column::Version.eq(settings.version))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }
}
