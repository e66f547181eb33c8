// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::keyword::{Keyword, KeywordPriority, KeywordStatus, StatusCounts};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

/// 状态转换时一并写入的字段
#[derive(Debug, Clone, Default)]
pub struct TransitionPatch {
    /// 写入的失败原因；`None` 表示清空
    pub error_message: Option<String>,
    /// 发布时关联的内容ID
    pub result_content_id: Option<Uuid>,
}

/// 新关键词的可选属性
#[derive(Debug, Clone, Default)]
pub struct NewKeyword {
    pub text: String,
    pub priority: KeywordPriority,
    pub related_terms: Vec<String>,
    pub search_intent: Option<String>,
    pub estimated_value: f64,
}

/// 关键词仓库特质
///
/// 所有写操作对单行关键词是原子的。
#[async_trait]
pub trait KeywordRepository: Send + Sync {
    /// 按优先级降序、创建时间升序获取待处理关键词
    async fn fetch_pending(&self, limit: u64) -> Result<Vec<Keyword>, RepositoryError>;

    /// 根据ID查找关键词
    async fn get(&self, id: Uuid) -> Result<Option<Keyword>, RepositoryError>;

    /// 比较并设置状态
    ///
    /// 仅当当前状态等于 `expected` 时写入 `next`，返回是否写入成功。
    /// 竞争同一关键词的调用中只有一个会得到 `true`。
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: KeywordStatus,
        next: KeywordStatus,
        patch: TransitionPatch,
    ) -> Result<bool, RepositoryError>;

    /// 各状态的数量
    async fn count_by_status(&self) -> Result<StatusCounts, RepositoryError>;

    /// 按规范化文本幂等插入；重复时静默跳过并返回 `None`
    async fn insert_if_absent(&self, keyword: NewKeyword) -> Result<Option<Keyword>, RepositoryError>;

    /// 返回给定规范化文本中已存在于仓库的那些
    async fn existing_normalized(
        &self,
        normalized_texts: &[String],
    ) -> Result<HashSet<String>, RepositoryError>;
}
