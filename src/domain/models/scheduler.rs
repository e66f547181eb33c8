// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 调度器设置
///
/// 单行持久化记录，`version` 用于比较并设置式更新。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    pub enabled: bool,
    pub items_per_run: u32,
    pub last_run_at: Option<DateTime<FixedOffset>>,
    pub version: i64,
}

impl SchedulerSettings {
    /// 同一自然日（UTC）内只允许运行一次
    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        match self.last_run_at {
            Some(last) => last.with_timezone(&Utc).date_naive() < now.date_naive(),
            None => true,
        }
    }

    /// 下一次可以运行的时间
    pub fn next_eligible_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.is_eligible_at(now) {
            return now;
        }
        next_day_start(now)
    }
}

/// 次日 00:00 UTC
pub fn next_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.date_naive() + Duration::days(1);
    Utc.from_utc_datetime(&tomorrow.and_time(NaiveTime::MIN))
}

/// 单个关键词的处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub keyword_id: Uuid,
    pub keyword: String,
    pub succeeded: bool,
    pub content_id: Option<Uuid>,
    pub slug: Option<String>,
    pub translations_created: usize,
    pub translations_failed: usize,
    pub error: Option<String>,
}

/// 批量运行汇总
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub keywords_researched: usize,
    pub items: Vec<ItemResult>,
    /// 未运行时的原因（已禁用、当日已运行）
    pub skipped_reason: Option<String>,
    pub next_eligible_run: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn skipped(reason: impl Into<String>, next_eligible_run: DateTime<Utc>) -> Self {
        Self {
            skipped_reason: Some(reason.into()),
            next_eligible_run: Some(next_eligible_run),
            ..Default::default()
        }
    }

    pub fn record(&mut self, item: ItemResult) {
        self.processed += 1;
        if item.succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.items.push(item);
    }
}
