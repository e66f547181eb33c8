// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::keyword::{Keyword, KeywordPriority, StatusCounts};
use crate::domain::repositories::keyword_repository::NewKeyword;
use crate::domain::services::keyword_research_service::KeywordCandidate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 新建关键词请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateKeywordRequestDto {
    /// 搜索短语
    #[validate(length(min = 1, max = 200))]
    pub text: String,
    pub priority: Option<KeywordPriority>,
    #[validate(length(max = 20))]
    pub related_terms: Option<Vec<String>>,
    #[validate(length(max = 50))]
    pub search_intent: Option<String>,
    #[validate(range(min = 0.0))]
    pub estimated_value: Option<f64>,
}

impl From<CreateKeywordRequestDto> for NewKeyword {
    fn from(dto: CreateKeywordRequestDto) -> Self {
        Self {
            text: dto.text,
            priority: dto.priority.unwrap_or_default(),
            related_terms: dto.related_terms.unwrap_or_default(),
            search_intent: dto.search_intent,
            estimated_value: dto.estimated_value.unwrap_or(0.0),
        }
    }
}

/// 新建关键词响应
///
/// 重复的关键词不会报错，`created` 为 false
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateKeywordResponseDto {
    pub created: bool,
    pub keyword: Option<Keyword>,
}

/// 关键词研究请求
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ResearchRequestDto {
    /// 需要的候选数量
    #[validate(range(min = 1, max = 100))]
    pub count: Option<usize>,
    /// 只返回候选，不写入
    pub dry_run: Option<bool>,
}

/// 关键词研究响应
#[derive(Debug, Serialize)]
pub struct ResearchResponseDto {
    pub dry_run: bool,
    pub candidates: Vec<KeywordCandidate>,
    pub inserted: Vec<Keyword>,
}

/// 关键词统计响应
#[derive(Debug, Deserialize, Serialize)]
pub struct KeywordStatsResponseDto {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total: u64,
}

impl From<StatusCounts> for KeywordStatsResponseDto {
    fn from(counts: StatusCounts) -> Self {
        let total = counts.total();
        Self { counts, total }
    }
}
