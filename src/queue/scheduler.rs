// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scheduler::{next_day_start, RunSummary, SchedulerSettings};
use crate::domain::repositories::scheduler_settings_repository::SchedulerSettingsRepository;
use crate::domain::services::keyword_research_service::KeywordResearchService;
use crate::domain::services::pipeline_service::PipelineService;
use crate::utils::errors::PipelineError;
use chrono::{DateTime, Utc};
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 设置更新在版本冲突时的最大尝试次数
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// 补充关键词的参数
#[derive(Debug, Clone)]
pub struct ReplenishPolicy {
    /// 待处理数量低于该值时触发研究
    pub min_pending: u64,
    /// 每次补充的候选数量
    pub count: usize,
}

/// 设置修改项，`None` 表示保持不变
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub enabled: Option<bool>,
    pub items_per_run: Option<u32>,
}

/// 流水线调度器
///
/// 提供幂等的“立即运行”入口：读取持久化设置，同一自然日（UTC）内只运行一次，
/// 必要时先补充关键词，再按优先级串行处理待处理关键词。
pub struct PipelineScheduler {
    settings_repo: Arc<dyn SchedulerSettingsRepository>,
    pipeline: Arc<PipelineService>,
    research: Arc<KeywordResearchService>,
    defaults: SchedulerSettings,
    replenish: ReplenishPolicy,
}

impl PipelineScheduler {
    /// 创建新的调度器实例
    ///
    /// # 参数
    ///
    /// * `settings_repo` - 调度设置仓库
    /// * `pipeline` - 流水线编排服务
    /// * `research` - 关键词研究服务
    /// * `defaults` - 首次运行时写入的默认设置
    /// * `replenish` - 关键词补充参数
    pub fn new(
        settings_repo: Arc<dyn SchedulerSettingsRepository>,
        pipeline: Arc<PipelineService>,
        research: Arc<KeywordResearchService>,
        defaults: SchedulerSettings,
        replenish: ReplenishPolicy,
    ) -> Self {
        Self {
            settings_repo,
            pipeline,
            research,
            defaults,
            replenish,
        }
    }

    /// 当前持久化的设置
    pub async fn settings(&self) -> Result<SchedulerSettings, PipelineError> {
        Ok(self.settings_repo.load_or_init(&self.defaults).await?)
    }

    /// 修改设置
    ///
    /// 读-改-写使用与关键词状态相同的比较并设置：版本冲突时重新读取后再试。
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<SchedulerSettings, PipelineError> {
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let current = self.settings_repo.load_or_init(&self.defaults).await?;
            let mut next = current.clone();
            if let Some(enabled) = patch.enabled {
                next.enabled = enabled;
            }
            if let Some(items) = patch.items_per_run {
                next.items_per_run = items;
            }

            if self.settings_repo.compare_and_set(&next).await? {
                next.version += 1;
                info!(enabled = next.enabled, items_per_run = next.items_per_run, "Scheduler settings updated");
                return Ok(next);
            }
            warn!(version = current.version, "Scheduler settings changed concurrently, retrying");
        }

        Err(PipelineError::Conflict(
            "scheduler settings are being modified concurrently".to_string(),
        ))
    }

    /// 立即运行
    pub async fn run_now(&self) -> Result<RunSummary, PipelineError> {
        self.run_at(Utc::now()).await
    }

    /// 以给定时间作为“现在”运行一次
    ///
    /// # 返回值
    ///
    /// * `Ok(RunSummary)` - 运行汇总；未运行时带 `skipped_reason`
    /// * `Err(PipelineError::Conflict)` - 另一个调用已领取本周期
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary, PipelineError> {
        let settings = self.settings_repo.load_or_init(&self.defaults).await?;

        if !settings.enabled {
            info!("Scheduler is disabled, skipping run");
            counter!("scheduler_runs_total", "outcome" => "disabled").increment(1);
            return Ok(RunSummary::skipped(
                "scheduler is disabled",
                settings.next_eligible_at(now),
            ));
        }

        if !settings.is_eligible_at(now) {
            info!(last_run_at = ?settings.last_run_at, "Scheduler already ran today, skipping");
            counter!("scheduler_runs_total", "outcome" => "already_ran").increment(1);
            return Ok(RunSummary::skipped(
                "already ran in the current period",
                next_day_start(now),
            ));
        }

        let mut claimed = settings.clone();
        claimed.last_run_at = Some(now.into());
        if !self.settings_repo.compare_and_set(&claimed).await? {
            counter!("scheduler_runs_total", "outcome" => "conflict").increment(1);
            return Err(PipelineError::Conflict(
                "another scheduler run claimed the current period".to_string(),
            ));
        }

        info!(items_per_run = settings.items_per_run, "Scheduler run started");
        let researched = self.replenish_if_low().await;

        let mut summary = self
            .pipeline
            .process_pending(u64::from(settings.items_per_run))
            .await?;
        summary.keywords_researched = researched;
        summary.next_eligible_run = Some(next_day_start(now));

        counter!("scheduler_runs_total", "outcome" => "completed").increment(1);
        info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            researched,
            "Scheduler run finished"
        );
        Ok(summary)
    }

    /// 待处理关键词不足时补充，失败只记录日志
    async fn replenish_if_low(&self) -> usize {
        let counts = match self.pipeline.keywords().count_by_status().await {
            Ok(counts) => counts,
            Err(e) => {
                error!("Failed to count keywords: {}", e);
                return 0;
            }
        };
        if counts.pending >= self.replenish.min_pending {
            return 0;
        }

        info!(pending = counts.pending, min_pending = self.replenish.min_pending, "Pending keywords low, running research");
        match self.research.replenish(self.replenish.count).await {
            Ok(inserted) => inserted.len(),
            Err(e) => {
                error!("Keyword research failed: {}", e);
                0
            }
        }
    }
}
