// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::dto::scheduler_request::RunPipelineQuery,
    domain::services::pipeline_service::{PipelineService, ProcessOutcome},
    presentation::errors::AppError,
    queue::scheduler::PipelineScheduler,
};

/// 立即为指定关键词生成内容
pub async fn generate_keyword(
    Extension(pipeline): Extension<Arc<PipelineService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProcessOutcome>, AppError> {
    let outcome = pipeline.process_keyword(id).await?;
    Ok(Json(outcome))
}

/// 重试失败的关键词
pub async fn retry_keyword(
    Extension(pipeline): Extension<Arc<PipelineService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProcessOutcome>, AppError> {
    let outcome = pipeline.retry(id).await?;
    Ok(Json(outcome))
}

/// 触发一次调度运行
///
/// `?background=true` 时在后台执行并立即返回 202
pub async fn run_pipeline(
    Extension(scheduler): Extension<Arc<PipelineScheduler>>,
    Query(query): Query<RunPipelineQuery>,
) -> Result<Response, AppError> {
    if query.background.unwrap_or(false) {
        tokio::spawn(async move {
            match scheduler.run_now().await {
                Ok(summary) => info!(
                    processed = summary.processed,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    "Background pipeline run finished"
                ),
                Err(e) => error!("Background pipeline run failed: {}", e),
            }
        });
        return Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": true }))).into_response());
    }

    let summary = scheduler.run_now().await?;
    Ok(Json(summary).into_response())
}
