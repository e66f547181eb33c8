// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::content::{Content, LocalizedContent, RelatedContent};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 内容仓库特质
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// slug 是否已被占用
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError>;

    /// 在独立事务中插入规范内容；slug 冲突时返回 `RepositoryError::Duplicate`
    async fn create_canonical(&self, content: &Content) -> Result<Content, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Content>, RepositoryError>;

    /// 标题、小标题或关键词包含任一词元的已发布内容，按发布时间降序
    ///
    /// `terms` 为小写词元；为空时返回空列表。
    async fn find_related(&self, terms: &[String], limit: u64) -> Result<Vec<RelatedContent>, RepositoryError>;

    /// 在一个事务中发布或撤回规范内容及其全部翻译
    async fn set_published_group(&self, id: Uuid, published: bool) -> Result<u64, RepositoryError>;

    /// 在一个事务中删除规范内容及其全部翻译
    async fn delete_group(&self, id: Uuid) -> Result<u64, RepositoryError>;
}

/// 本地化内容仓库特质
#[async_trait]
pub trait LocalizedContentRepository: Send + Sync {
    /// 已存在翻译的语言代码
    async fn existing_languages(&self, original_content_id: Uuid) -> Result<Vec<String>, RepositoryError>;

    /// 插入一条翻译；同语言已存在时返回 `RepositoryError::Duplicate`
    async fn insert(&self, localized: &LocalizedContent) -> Result<LocalizedContent, RepositoryError>;

    async fn list_for(&self, original_content_id: Uuid) -> Result<Vec<LocalizedContent>, RepositoryError>;
}
