// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    application::dto::scheduler_request::UpdateSchedulerSettingsDto,
    domain::models::scheduler::SchedulerSettings,
    presentation::errors::{AppError, RequestValidationError},
    queue::scheduler::PipelineScheduler,
};

pub async fn get_settings(
    Extension(scheduler): Extension<Arc<PipelineScheduler>>,
) -> Result<Json<SchedulerSettings>, AppError> {
    Ok(Json(scheduler.settings().await?))
}

pub async fn update_settings(
    Extension(scheduler): Extension<Arc<PipelineScheduler>>,
    Json(request): Json<UpdateSchedulerSettingsDto>,
) -> Result<Json<SchedulerSettings>, AppError> {
    request.validate().map_err(RequestValidationError::from)?;
    let updated = scheduler.update_settings(request.into()).await?;
    Ok(Json(updated))
}
