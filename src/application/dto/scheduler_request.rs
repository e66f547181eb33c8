// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::scheduler::SettingsPatch;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 修改调度设置请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateSchedulerSettingsDto {
    pub enabled: Option<bool>,
    /// 每次运行处理的关键词数量
    #[validate(range(min = 1, max = 50))]
    pub items_per_run: Option<u32>,
}

impl From<UpdateSchedulerSettingsDto> for SettingsPatch {
    fn from(dto: UpdateSchedulerSettingsDto) -> Self {
        Self {
            enabled: dto.enabled,
            items_per_run: dto.items_per_run,
        }
    }
}

/// 运行流水线的查询参数
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RunPipelineQuery {
    /// 为 true 时后台运行并立即返回 202
    pub background: Option<bool>,
}
