// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 关键词实体
///
/// 内容生成流水线的工作单元。一个关键词驱动一次长文生成，
/// 成功后通过 `result_content_id` 关联到唯一的规范内容记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    /// 关键词唯一标识符
    pub id: Uuid,
    /// 驱动内容生成的搜索短语
    pub text: String,
    /// 可选的搜索意图分类
    pub search_intent: Option<String>,
    /// 估算价值（例如单次点击成本），用于排序
    pub estimated_value: f64,
    /// 优先级
    pub priority: KeywordPriority,
    /// 当前生命周期状态
    pub status: KeywordStatus,
    /// 相关词，作为内链查找的提示
    pub related_terms: Vec<String>,
    /// 生成成功后关联的内容ID
    pub result_content_id: Option<Uuid>,
    /// 最近一次失败原因，重试时清空
    pub error_message: Option<String>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 开始生成时间
    pub generation_started_at: Option<DateTime<FixedOffset>>,
    /// 发布时间
    pub published_at: Option<DateTime<FixedOffset>>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

impl Keyword {
    /// 创建一个新的待处理关键词
    pub fn new(text: impl Into<String>, priority: KeywordPriority, related_terms: Vec<String>) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            text: text.into().trim().to_string(),
            search_intent: None,
            estimated_value: 0.0,
            priority,
            status: KeywordStatus::Pending,
            related_terms,
            result_content_id: None,
            error_message: None,
            created_at: now,
            generation_started_at: None,
            published_at: None,
            updated_at: now,
        }
    }

    /// 去重使用的规范化文本
    pub fn normalized_text(&self) -> String {
        normalize_keyword_text(&self.text)
    }
}

/// 规范化关键词文本：去除首尾空白、折叠内部空白并转为小写
pub fn normalize_keyword_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 关键词优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeywordPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl KeywordPriority {
    /// 存储用的排序值，数值越大越优先
    pub fn rank(self) -> i32 {
        match self {
            KeywordPriority::High => 3,
            KeywordPriority::Medium => 2,
            KeywordPriority::Low => 1,
        }
    }

    pub fn from_rank(rank: i32) -> Self {
        match rank {
            r if r >= 3 => KeywordPriority::High,
            2 => KeywordPriority::Medium,
            _ => KeywordPriority::Low,
        }
    }
}

impl fmt::Display for KeywordPriority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeywordPriority::High => write!(f, "high"),
            KeywordPriority::Medium => write!(f, "medium"),
            KeywordPriority::Low => write!(f, "low"),
        }
    }
}

impl FromStr for KeywordPriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(KeywordPriority::High),
            "medium" => Ok(KeywordPriority::Medium),
            "low" => Ok(KeywordPriority::Low),
            _ => Err(()),
        }
    }
}

/// 关键词状态
///
/// 状态转换遵循以下流程：
/// Pending → Generating → Published/Failed，Failed 仅能通过显式重试回到 Pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeywordStatus {
    #[default]
    Pending,
    Generating,
    Published,
    Failed,
}

/// 驱动关键词状态机的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordEvent {
    /// 编排器领取关键词开始生成
    StartGeneration,
    /// 规范内容已持久化，翻译已尝试
    Publish,
    /// 生成、校验或持久化阶段出现不可恢复的错误
    Fail,
    /// 显式重试
    Retry,
}

impl KeywordEvent {
    /// 该事件唯一合法的源状态，作为存储层比较并设置的期望值
    pub fn source_status(self) -> KeywordStatus {
        match self {
            KeywordEvent::StartGeneration => KeywordStatus::Pending,
            KeywordEvent::Publish | KeywordEvent::Fail => KeywordStatus::Generating,
            KeywordEvent::Retry => KeywordStatus::Failed,
        }
    }
}

impl fmt::Display for KeywordEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeywordEvent::StartGeneration => write!(f, "start_generation"),
            KeywordEvent::Publish => write!(f, "publish"),
            KeywordEvent::Fail => write!(f, "fail"),
            KeywordEvent::Retry => write!(f, "retry"),
        }
    }
}

impl KeywordStatus {
    /// 状态机唯一的转换函数，拒绝所有非法转换
    pub fn transition(self, event: KeywordEvent) -> Result<KeywordStatus, DomainError> {
        match (self, event) {
            (KeywordStatus::Pending, KeywordEvent::StartGeneration) => Ok(KeywordStatus::Generating),
            (KeywordStatus::Generating, KeywordEvent::Publish) => Ok(KeywordStatus::Published),
            (KeywordStatus::Generating, KeywordEvent::Fail) => Ok(KeywordStatus::Failed),
            (KeywordStatus::Failed, KeywordEvent::Retry) => Ok(KeywordStatus::Pending),
            (from, event) => Err(DomainError::InvalidStateTransition { from, event }),
        }
    }

    /// 是否为终态（不会再自动变化）
    pub fn is_terminal(self) -> bool {
        matches!(self, KeywordStatus::Published | KeywordStatus::Failed)
    }

    pub fn all() -> [KeywordStatus; 4] {
        [
            KeywordStatus::Pending,
            KeywordStatus::Generating,
            KeywordStatus::Published,
            KeywordStatus::Failed,
        ]
    }
}

impl fmt::Display for KeywordStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeywordStatus::Pending => write!(f, "pending"),
            KeywordStatus::Generating => write!(f, "generating"),
            KeywordStatus::Published => write!(f, "published"),
            KeywordStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for KeywordStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(KeywordStatus::Pending),
            "generating" => Ok(KeywordStatus::Generating),
            "published" => Ok(KeywordStatus::Published),
            "failed" => Ok(KeywordStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition: cannot apply {event} to a {from} keyword")]
    InvalidStateTransition {
        from: KeywordStatus,
        event: KeywordEvent,
    },
}

/// 各状态的关键词数量
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub generating: u64,
    pub published: u64,
    pub failed: u64,
}

impl StatusCounts {
    pub fn set(&mut self, status: KeywordStatus, count: u64) {
        match status {
            KeywordStatus::Pending => self.pending = count,
            KeywordStatus::Generating => self.generating = count,
            KeywordStatus::Published => self.published = count,
            KeywordStatus::Failed => self.failed = count,
        }
    }

    pub fn total(&self) -> u64 {
        self.pending + self.generating + self.published + self.failed
    }
}
