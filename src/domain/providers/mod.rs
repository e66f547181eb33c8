// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 外部服务契约
//!
//! 核心只依赖这些特质，具体的 HTTP 客户端位于 `infrastructure::providers`。

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("{provider} timed out after {millis}ms")]
    Timeout { provider: &'static str, millis: u64 },
    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} transport error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// 以毫秒记录的超时错误
    pub fn timeout(provider: &'static str, timeout: Duration) -> Self {
        ProviderError::Timeout {
            provider,
            millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// 超时、网络错误、429 和 5xx 可以重试
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Timeout { .. } | ProviderError::Transport { .. } => true,
            ProviderError::Http { status, .. } => *status == 429 || *status >= 500,
            ProviderError::NotConfigured(_) | ProviderError::InvalidResponse { .. } => false,
        }
    }
}

/// 生成式内容服务：纯文本输入，纯文本输出
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}

/// 翻译服务：每个字段、每种语言独立调用
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language_tag: &str) -> Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}

/// 关键词联想服务
#[async_trait]
pub trait KeywordSuggester: Send + Sync {
    async fn suggest(&self, seed_phrase: &str) -> Result<Vec<String>, ProviderError>;

    fn name(&self) -> &'static str;
}
