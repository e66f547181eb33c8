// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::models::content::{Content, LocalizedContent},
    domain::repositories::content_repository::{ContentRepository, LocalizedContentRepository},
    domain::services::pipeline_service::PipelineService,
    domain::services::translation_service::FanOutReport,
    presentation::errors::AppError,
    utils::errors::PipelineError,
};

/// 查询规范内容
pub async fn get_content(
    Extension(contents): Extension<Arc<dyn ContentRepository>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Content>, AppError> {
    let content = contents
        .find_by_id(id)
        .await?
        .ok_or_else(|| PipelineError::NotFound(format!("content {}", id)))?;
    Ok(Json(content))
}

/// 补齐缺失的翻译
pub async fn translate_content(
    Extension(pipeline): Extension<Arc<PipelineService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FanOutReport>, AppError> {
    Ok(Json(pipeline.translate_content(id).await?))
}

/// 列出内容的全部翻译
pub async fn list_translations(
    Extension(contents): Extension<Arc<dyn ContentRepository>>,
    Extension(localized): Extension<Arc<dyn LocalizedContentRepository>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LocalizedContent>>, AppError> {
    if contents.find_by_id(id).await?.is_none() {
        return Err(PipelineError::NotFound(format!("content {}", id)).into());
    }
    Ok(Json(localized.list_for(id).await?))
}

/// 发布内容组
pub async fn publish_content(
    Extension(pipeline): Extension<Arc<PipelineService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let rows = pipeline.set_content_published(id, true).await?;
    Ok(Json(json!({ "published": true, "rows": rows })))
}

/// 取消发布内容组
pub async fn unpublish_content(
    Extension(pipeline): Extension<Arc<PipelineService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let rows = pipeline.set_content_published(id, false).await?;
    Ok(Json(json!({ "published": false, "rows": rows })))
}

/// 删除内容组
pub async fn delete_content(
    Extension(pipeline): Extension<Arc<PipelineService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    pipeline.delete_content(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
