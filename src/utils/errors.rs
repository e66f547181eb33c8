// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::keyword::DomainError;
use crate::domain::providers::ProviderError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(DbErr),

    /// 记录未找到
    #[error("Record not found")]
    NotFound,

    /// 唯一约束冲突
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// 存储的数据无法解码
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => RepositoryError::Duplicate(detail),
            _ => RepositoryError::Database(err),
        }
    }
}

/// 流水线错误类型
///
/// 除 `NotFound` 和 `Conflict` 会同步返回给调用方外，
/// 其余错误在生成阶段都会将关键词推进到 failed 状态。
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 引用的关键词或内容不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 状态比较并设置失败，关键词不处于可操作状态
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 生成服务的输出无法解析为结构化数据
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// 草稿未通过最低质量检查
    #[error("Validation error: {field} {reason}")]
    ValidationError { field: String, reason: String },

    /// 外部调用在重试耗尽后仍失败或超时
    #[error("Provider failure: {0}")]
    ProviderFailure(#[from] ProviderError),

    /// 数据存储拒绝了读写
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl PipelineError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 错误类别名称，用于指标标签和日志
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NotFound(_) => "not_found",
            PipelineError::Conflict(_) => "conflict",
            PipelineError::MalformedResponse(_) => "malformed_response",
            PipelineError::ValidationError { .. } => "validation_error",
            PipelineError::ProviderFailure(_) => "provider_failure",
            PipelineError::PersistenceFailure(_) => "persistence_failure",
        }
    }
}

impl From<RepositoryError> for PipelineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => PipelineError::NotFound("record not found".to_string()),
            other => PipelineError::PersistenceFailure(other.to_string()),
        }
    }
}

impl From<DomainError> for PipelineError {
    fn from(err: DomainError) -> Self {
        PipelineError::Conflict(err.to_string())
    }
}
