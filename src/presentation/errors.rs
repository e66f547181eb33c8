// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::utils::errors::{PipelineError, RepositoryError};

/// 请求参数校验失败
#[derive(Error, Debug)]
#[error("Invalid request: {0}")]
pub struct RequestValidationError(pub String);

impl From<validator::ValidationErrors> for RequestValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self(errors.to_string())
    }
}

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        if let Some(err) = self.0.downcast_ref::<PipelineError>() {
            let status = match err {
                PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
                PipelineError::Conflict(_) => StatusCode::CONFLICT,
                PipelineError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::MalformedResponse(_) | PipelineError::ProviderFailure(_) => {
                    StatusCode::BAD_GATEWAY
                }
                PipelineError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            return (status, err.kind());
        }

        if self.0.downcast_ref::<RequestValidationError>().is_some() {
            return (StatusCode::BAD_REQUEST, "invalid_request");
        }

        match self.0.downcast_ref::<RepositoryError>() {
            Some(RepositoryError::NotFound) => (StatusCode::NOT_FOUND, "not_found"),
            Some(RepositoryError::Duplicate(_)) => (StatusCode::CONFLICT, "conflict"),
            Some(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence_failure"),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(kind, "Request failed: {}", self.0);
        }

        let body = Json(json!({ "error": self.0.to_string(), "kind": kind }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
