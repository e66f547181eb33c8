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


use crate::domain::models::content::{Content, LocalizedContent, RelatedContent};
use crate::domain::repositories::content_repository::{
    ContentRepository, LocalizedContentRepository,
};
use crate::infrastructure::database::entities::{
    content as content_entity, localized_content as localized_entity,
};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Alias, Expr, Func},
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// 内容仓库实现
///
/// 规范内容与翻译组的批量写入（发布、删除）都包裹在显式事务中。
#[derive(Clone)]
pub struct ContentRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ContentRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<content_entity::Model> for Content {
    fn from(model: content_entity::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            title: model.title,
            excerpt: model.excerpt,
            body: model.body,
            headings: serde_json::from_value(model.headings).unwrap_or_default(),
            keywords: serde_json::from_value(model.keywords).unwrap_or_default(),
            thumbnail_url: model.thumbnail_url,
            seo_meta: serde_json::from_value(model.seo_meta).unwrap_or_default(),
            is_published: model.is_published,
            published_at: model.published_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<content_entity::Model> for RelatedContent {
    fn from(model: content_entity::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            title: model.title,
            headings: serde_json::from_value(model.headings).unwrap_or_default(),
            keywords: serde_json::from_value(model.keywords).unwrap_or_default(),
            published_at: model.published_at,
        }
    }
}

impl From<&Content> for content_entity::ActiveModel {
    fn from(content: &Content) -> Self {
        Self {
            id: Set(content.id),
            slug: Set(content.slug.clone()),
            title: Set(content.title.clone()),
            excerpt: Set(content.excerpt.clone()),
            body: Set(content.body.clone()),
            headings: Set(json!(content.headings)),
            keywords: Set(json!(content.keywords)),
            thumbnail_url: Set(content.thumbnail_url.clone()),
            seo_meta: Set(json!(content.seo_meta)),
            is_published: Set(content.is_published),
            published_at: Set(content.published_at),
            created_at: Set(content.created_at),
            updated_at: Set(content.updated_at),
        }
    }
}

impl From<localized_entity::Model> for LocalizedContent {
    fn from(model: localized_entity::Model) -> Self {
        Self {
            id: model.id,
            original_content_id: model.original_content_id,
            language_code: model.language_code,
            slug: model.slug,
            title: model.title,
            excerpt: model.excerpt,
            body: model.body,
            headings: serde_json::from_value(model.headings).unwrap_or_default(),
            keywords: serde_json::from_value(model.keywords).unwrap_or_default(),
            thumbnail_url: model.thumbnail_url,
            seo_meta: serde_json::from_value(model.seo_meta).unwrap_or_default(),
            is_published: model.is_published,
            published_at: model.published_at,
            created_at: model.created_at,
        }
    }
}

impl From<&LocalizedContent> for localized_entity::ActiveModel {
    fn from(localized: &LocalizedContent) -> Self {
        Self {
            id: Set(localized.id),
            original_content_id: Set(localized.original_content_id),
            language_code: Set(localized.language_code.clone()),
            slug: Set(localized.slug.clone()),
            title: Set(localized.title.clone()),
            excerpt: Set(localized.excerpt.clone()),
            body: Set(localized.body.clone()),
            headings: Set(json!(localized.headings)),
            keywords: Set(json!(localized.keywords)),
            thumbnail_url: Set(localized.thumbnail_url.clone()),
            seo_meta: Set(json!(localized.seo_meta)),
            is_published: Set(localized.is_published),
            published_at: Set(localized.published_at),
            created_at: Set(localized.created_at),
        }
    }
}

#[async_trait]
impl ContentRepository for ContentRepositoryImpl {
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        let count = content_entity::Entity::find()
            .filter(content_entity::Column::Slug.eq(slug))
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }

    async fn create_canonical(&self, content: &Content) -> Result<Content, RepositoryError> {
        let txn = self.db.begin().await?;

        let model: content_entity::ActiveModel = content.into();
        content_entity::Entity::insert(model)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        Ok(content.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Content>, RepositoryError> {
        let model = content_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_related(&self, terms: &[String], limit: u64) -> Result<Vec<RelatedContent>, RepositoryError> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // JSON 列统一转成文本再做不区分大小写的包含匹配
        let mut any_term = Condition::any();
        for term in terms {
            let pattern = format!("%{}%", term.to_lowercase());
            for column in [
                content_entity::Column::Title,
                content_entity::Column::Headings,
                content_entity::Column::Keywords,
            ] {
                any_term = any_term.add(
                    Expr::expr(Func::lower(Expr::col(column).cast_as(Alias::new("text"))))
                        .like(pattern.clone()),
                );
            }
        }

        let models = content_entity::Entity::find()
            .filter(content_entity::Column::IsPublished.eq(true))
            .filter(any_term)
            .order_by_desc(content_entity::Column::PublishedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn set_published_group(&self, id: Uuid, published: bool) -> Result<u64, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let published_at = if published { Some(now) } else { None };

        let txn = self.db.begin().await?;

        let canonical = content_entity::Entity::update_many()
            .col_expr(content_entity::Column::IsPublished, Expr::value(published))
            .col_expr(content_entity::Column::PublishedAt, Expr::value(published_at))
            .col_expr(content_entity::Column::UpdatedAt, Expr::value(now))
            .filter(content_entity::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        if canonical.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(0);
        }

        let localized = localized_entity::Entity::update_many()
            .col_expr(localized_entity::Column::IsPublished, Expr::value(published))
            .col_expr(localized_entity::Column::PublishedAt, Expr::value(published_at))
            .filter(localized_entity::Column::OriginalContentId.eq(id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(canonical.rows_affected + localized.rows_affected)
    }

    async fn delete_group(&self, id: Uuid) -> Result<u64, RepositoryError> {
        let txn = self.db.begin().await?;

        // the foreign key cascades on postgres, but sqlite does not enforce it by default
        let localized = localized_entity::Entity::delete_many()
            .filter(localized_entity::Column::OriginalContentId.eq(id))
            .exec(&txn)
            .await?;
        let canonical = content_entity::Entity::delete_by_id(id).exec(&txn).await?;

        if canonical.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(0);
        }

        txn.commit().await?;
        Ok(canonical.rows_affected + localized.rows_affected)
    }
}

/// 翻译内容仓库实现
#[derive(Clone)]
pub struct LocalizedContentRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl LocalizedContentRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LocalizedContentRepository for LocalizedContentRepositoryImpl {
    async fn existing_languages(&self, original_content_id: Uuid) -> Result<Vec<String>, RepositoryError> {
        let codes: Vec<String> = localized_entity::Entity::find()
            .select_only()
            .column(localized_entity::Column::LanguageCode)
            .filter(localized_entity::Column::OriginalContentId.eq(original_content_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await?;
        Ok(codes)
    }

    async fn insert(&self, localized: &LocalizedContent) -> Result<LocalizedContent, RepositoryError> {
        let model: localized_entity::ActiveModel = localized.into();
        localized_entity::Entity::insert(model)
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(localized.clone())
    }

    async fn list_for(&self, original_content_id: Uuid) -> Result<Vec<LocalizedContent>, RepositoryError> {
        let models = localized_entity::Entity::find()
            .filter(localized_entity::Column::OriginalContentId.eq(original_content_id))
            .order_by_asc(localized_entity::Column::LanguageCode)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
