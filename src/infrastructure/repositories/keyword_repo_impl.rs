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


use crate::domain::models::keyword::{
    normalize_keyword_text, Keyword, KeywordPriority, KeywordStatus, StatusCounts,
};
use crate::domain::repositories::keyword_repository::{
    KeywordRepository, NewKeyword, TransitionPatch,
};
use crate::infrastructure::database::entities::keyword as keyword_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// 关键词仓库实现
///
/// 基于SeaORM实现的关键词数据访问层。
/// 状态写入全部是带期望状态的条件更新，以受影响行数判断是否成功。
#[derive(Clone)]
pub struct KeywordRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl KeywordRepositoryImpl {
    /// 创建新的关键词仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<keyword_entity::Model> for Keyword {
    fn from(model: keyword_entity::Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
            search_intent: model.search_intent,
            estimated_value: model.estimated_value,
            priority: KeywordPriority::from_rank(model.priority),
            status: model.status.parse().unwrap_or_default(),
            related_terms: serde_json::from_value(model.related_terms).unwrap_or_default(),
            result_content_id: model.result_content_id,
            error_message: model.error_message,
            created_at: model.created_at,
            generation_started_at: model.generation_started_at,
            published_at: model.published_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Keyword> for keyword_entity::ActiveModel {
    fn from(keyword: &Keyword) -> Self {
        Self {
            id: Set(keyword.id),
            text: Set(keyword.text.clone()),
            normalized_text: Set(keyword.normalized_text()),
            search_intent: Set(keyword.search_intent.clone()),
            estimated_value: Set(keyword.estimated_value),
            priority: Set(keyword.priority.rank()),
            status: Set(keyword.status.to_string()),
            related_terms: Set(serde_json::json!(keyword.related_terms)),
            result_content_id: Set(keyword.result_content_id),
            error_message: Set(keyword.error_message.clone()),
            created_at: Set(keyword.created_at),
            generation_started_at: Set(keyword.generation_started_at),
            published_at: Set(keyword.published_at),
            updated_at: Set(keyword.updated_at),
        }
    }
}

#[async_trait]
impl KeywordRepository for KeywordRepositoryImpl {
    async fn fetch_pending(&self, limit: u64) -> Result<Vec<Keyword>, RepositoryError> {
        let models = keyword_entity::Entity::find()
            .filter(keyword_entity::Column::Status.eq(KeywordStatus::Pending.to_string()))
            .order_by_desc(keyword_entity::Column::Priority)
            .order_by_asc(keyword_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Keyword>, RepositoryError> {
        let model = keyword_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: KeywordStatus,
        next: KeywordStatus,
        patch: TransitionPatch,
    ) -> Result<bool, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();

        let mut update = keyword_entity::Entity::update_many()
            .col_expr(keyword_entity::Column::Status, Expr::value(next.to_string()))
            .col_expr(
                keyword_entity::Column::ErrorMessage,
                Expr::value(patch.error_message),
            )
            .col_expr(keyword_entity::Column::UpdatedAt, Expr::value(now))
            .filter(keyword_entity::Column::Id.eq(id))
            .filter(keyword_entity::Column::Status.eq(expected.to_string()));

        match next {
            KeywordStatus::Generating => {
                update = update.col_expr(
                    keyword_entity::Column::GenerationStartedAt,
                    Expr::value(Some(now)),
                );
            }
            KeywordStatus::Published => {
                // only one content record may ever be attached
                update = update
                    .col_expr(keyword_entity::Column::PublishedAt, Expr::value(Some(now)))
                    .filter(keyword_entity::Column::ResultContentId.is_null());
            }
            KeywordStatus::Pending | KeywordStatus::Failed => {}
        }

        if let Some(content_id) = patch.result_content_id {
            update = update.col_expr(
                keyword_entity::Column::ResultContentId,
                Expr::value(Some(content_id)),
            );
        }

        let result = update.exec(self.db.as_ref()).await?;
        Ok(result.rows_affected == 1)
    }

    async fn count_by_status(&self) -> Result<StatusCounts, RepositoryError> {
        let rows: Vec<(String, i64)> = keyword_entity::Entity::find()
            .select_only()
            .column(keyword_entity::Column::Status)
            .column_as(Expr::col(keyword_entity::Column::Id).count(), "count")
            .group_by(keyword_entity::Column::Status)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            let status: KeywordStatus = status
                .parse()
                .map_err(|_| RepositoryError::Corrupt(format!("unknown keyword status '{}'", status)))?;
            counts.set(status, count.max(0) as u64);
        }
        Ok(counts)
    }

    async fn insert_if_absent(&self, keyword: NewKeyword) -> Result<Option<Keyword>, RepositoryError> {
        if normalize_keyword_text(&keyword.text).is_empty() {
            return Ok(None);
        }

        let mut record = Keyword::new(keyword.text, keyword.priority, keyword.related_terms);
        record.search_intent = keyword.search_intent;
        record.estimated_value = keyword.estimated_value;

        let model: keyword_entity::ActiveModel = (&record).into();
        let inserted = keyword_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(keyword_entity::Column::NormalizedText)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn existing_normalized(
        &self,
        normalized_texts: &[String],
    ) -> Result<HashSet<String>, RepositoryError> {
        if normalized_texts.is_empty() {
            return Ok(HashSet::new());
        }

        let mut existing = HashSet::new();
        for chunk in normalized_texts.chunks(500) {
            let rows: Vec<String> = keyword_entity::Entity::find()
                .select_only()
                .column(keyword_entity::Column::NormalizedText)
                .filter(keyword_entity::Column::NormalizedText.is_in(chunk.iter().cloned()))
                .into_tuple()
                .all(self.db.as_ref())
                .await?;
            existing.extend(rows);
        }
        Ok(existing)
    }
}
