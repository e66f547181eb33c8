// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{draft_response, test_settings, FakeTranslator, ScriptedGenerator, TestContext};
use chrono::{Duration, TimeZone, Utc};
use contentrs::domain::models::keyword::KeywordStatus;
use contentrs::domain::repositories::keyword_repository::KeywordRepository;
use contentrs::queue::scheduler::SettingsPatch;

/// 每个自然日最多运行一次
#[tokio::test]
async fn test_scheduler_runs_once_per_day() {
    let generator = ScriptedGenerator::new(vec![
        Ok(draft_response("Korea eSIM Guide", 5, 5, 2600)),
        Ok(draft_response("Japan Pocket WiFi", 5, 5, 2600)),
    ]);
    let ctx = TestContext::new(generator.clone(), FakeTranslator::new()).await;
    ctx.insert_keyword("korea esim guide").await;
    ctx.insert_keyword("japan pocket wifi").await;

    let morning = Utc.with_ymd_and_hms(2025, 12, 20, 9, 0, 0).unwrap();
    let summary = ctx.container.scheduler.run_at(morning).await.unwrap();
    assert!(summary.skipped_reason.is_none());
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(
        summary.next_eligible_run,
        Some(Utc.with_ymd_and_hms(2025, 12, 21, 0, 0, 0).unwrap())
    );

    let later = morning + Duration::hours(6);
    let skipped = ctx.container.scheduler.run_at(later).await.unwrap();
    assert!(skipped.skipped_reason.is_some());
    assert_eq!(skipped.processed, 0);
    assert_eq!(generator.calls(), 2);

    let tomorrow = morning + Duration::days(1);
    let next = ctx.container.scheduler.run_at(tomorrow).await.unwrap();
    assert!(next.skipped_reason.is_none());
    assert_eq!(next.processed, 0);
}

/// 禁用后不处理任何关键词
#[tokio::test]
async fn test_disabled_scheduler_skips() {
    let generator = ScriptedGenerator::new(vec![]);
    let ctx = TestContext::new(generator.clone(), FakeTranslator::new()).await;
    let keyword = ctx.insert_keyword("travel esim").await;

    let updated = ctx
        .container
        .scheduler
        .update_settings(SettingsPatch {
            enabled: Some(false),
            items_per_run: None,
        })
        .await
        .unwrap();
    assert!(!updated.enabled);

    let summary = ctx.container.scheduler.run_now().await.unwrap();
    assert_eq!(summary.skipped_reason.as_deref(), Some("scheduler is disabled"));
    assert_eq!(generator.calls(), 0);

    let stored = ctx.container.keywords.get(keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.status, KeywordStatus::Pending);
}

/// 设置更新会持久化并递增版本
#[tokio::test]
async fn test_update_settings_bumps_version() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;

    let before = ctx.container.scheduler.settings().await.unwrap();
    assert!(before.enabled);
    assert_eq!(before.items_per_run, 3);

    let after = ctx
        .container
        .scheduler
        .update_settings(SettingsPatch {
            enabled: None,
            items_per_run: Some(7),
        })
        .await
        .unwrap();
    assert_eq!(after.items_per_run, 7);
    assert_eq!(after.version, before.version + 1);

    let reloaded = ctx.container.scheduler.settings().await.unwrap();
    assert_eq!(reloaded, after);
}

/// 待处理关键词不足时先补充再处理
#[tokio::test]
async fn test_low_pending_triggers_research() {
    let settings = {
        let mut settings = test_settings();
        settings.research.min_pending = 5;
        settings.research.replenish_count = 8;
        settings
    };
    let generator = ScriptedGenerator::new(vec![]);
    let ctx = TestContext::with_settings(settings, generator, FakeTranslator::new()).await;

    let summary = ctx.container.scheduler.run_now().await.unwrap();
    assert_eq!(summary.keywords_researched, 8);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed, 3);

    let counts = ctx.container.keywords.count_by_status().await.unwrap();
    assert_eq!(counts.total(), 8);
    assert_eq!(counts.failed, 3);
    assert_eq!(counts.pending, 5);
}
