// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::keyword_request::{
        CreateKeywordRequestDto, CreateKeywordResponseDto, KeywordStatsResponseDto,
        ResearchRequestDto, ResearchResponseDto,
    },
    config::settings::Settings,
    domain::models::keyword::{normalize_keyword_text, Keyword},
    domain::repositories::keyword_repository::KeywordRepository,
    domain::services::keyword_research_service::KeywordResearchService,
    presentation::errors::{AppError, RequestValidationError},
    utils::errors::PipelineError,
};

/// 新建关键词
///
/// 按规范化文本幂等：重复提交返回 200 且 `created` 为 false
pub async fn create_keyword(
    Extension(keywords): Extension<Arc<dyn KeywordRepository>>,
    Json(request): Json<CreateKeywordRequestDto>,
) -> Result<(StatusCode, Json<CreateKeywordResponseDto>), AppError> {
    request.validate().map_err(RequestValidationError::from)?;
    if normalize_keyword_text(&request.text).is_empty() {
        return Err(RequestValidationError("text must not be blank".to_string()).into());
    }

    let inserted = keywords.insert_if_absent(request.into()).await?;
    let status = if inserted.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(CreateKeywordResponseDto {
            created: inserted.is_some(),
            keyword: inserted,
        }),
    ))
}

/// 查询单个关键词
pub async fn get_keyword(
    Extension(keywords): Extension<Arc<dyn KeywordRepository>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Keyword>, AppError> {
    let keyword = keywords
        .get(id)
        .await?
        .ok_or_else(|| PipelineError::NotFound(format!("keyword {}", id)))?;
    Ok(Json(keyword))
}

/// 各状态的关键词数量
pub async fn keyword_stats(
    Extension(keywords): Extension<Arc<dyn KeywordRepository>>,
) -> Result<Json<KeywordStatsResponseDto>, AppError> {
    let counts = keywords.count_by_status().await?;
    Ok(Json(counts.into()))
}

/// 执行关键词研究
///
/// `dry_run` 为 true 时只返回候选
pub async fn research_keywords(
    Extension(research): Extension<Arc<KeywordResearchService>>,
    Extension(settings): Extension<Arc<Settings>>,
    Json(request): Json<ResearchRequestDto>,
) -> Result<Json<ResearchResponseDto>, AppError> {
    request.validate().map_err(RequestValidationError::from)?;

    let count = request.count.unwrap_or(settings.research.replenish_count);
    let dry_run = request.dry_run.unwrap_or(false);

    let response = if dry_run {
        ResearchResponseDto {
            dry_run,
            candidates: research.discover(count).await?,
            inserted: Vec::new(),
        }
    } else {
        let inserted = research.replenish(count).await?;
        info!(inserted = inserted.len(), "Keyword research requested via API");
        ResearchResponseDto {
            dry_run,
            candidates: Vec::new(),
            inserted,
        }
    };

    Ok(Json(response))
}
