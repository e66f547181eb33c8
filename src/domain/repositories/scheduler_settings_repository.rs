// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scheduler::SchedulerSettings;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 调度器设置仓库特质
#[async_trait]
pub trait SchedulerSettingsRepository: Send + Sync {
    /// 读取设置；不存在时以 `defaults` 初始化
    async fn load_or_init(&self, defaults: &SchedulerSettings) -> Result<SchedulerSettings, RepositoryError>;

    /// 当存储中的 version 等于 `settings.version` 时写入并将 version 加一，
    /// 返回是否写入成功
    async fn compare_and_set(&self, settings: &SchedulerSettings) -> Result<bool, RepositoryError>;
}
