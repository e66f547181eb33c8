// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    draft_response, published_content, CounterRecorder, FakeTranslator, ScriptedGenerator,
    TestContext,
};
use async_trait::async_trait;
use chrono::Duration;
use contentrs::domain::models::content::{Content, RelatedContent};
use contentrs::domain::models::keyword::KeywordStatus;
use contentrs::domain::providers::{ContentGenerator, ProviderError};
use contentrs::domain::repositories::content_repository::{
    ContentRepository, LocalizedContentRepository,
};
use contentrs::domain::repositories::keyword_repository::{KeywordRepository, TransitionPatch};
use contentrs::infrastructure::repositories::content_repo_impl::ContentRepositoryImpl;
use contentrs::utils::errors::{PipelineError, RepositoryError};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 完整流程：生成、定稿、翻译（俄语失败）、发布
#[tokio::test]
async fn test_happy_path_publishes_content_and_translations() {
    let generator = ScriptedGenerator::new(vec![Ok(draft_response(
        "Korea SIM Card Guide for Travelers",
        6,
        7,
        3200,
    ))]);
    let ctx = TestContext::new(generator, FakeTranslator::failing(&["ru"])).await;
    let keyword = ctx.insert_keyword("Korea SIM card guide").await;

    let outcome = ctx
        .container
        .pipeline
        .process_keyword(keyword.id)
        .await
        .unwrap();

    assert_eq!(outcome.content.slug, "korea-sim-card-guide");
    assert!(outcome.content.is_published);
    assert_eq!(outcome.content.headings.len(), 6);
    assert_eq!(outcome.content.keywords.len(), 7);
    assert_eq!(outcome.translations.created.len(), 10);
    assert_eq!(outcome.translations.failed.len(), 1);
    assert_eq!(outcome.translations.failed[0].language_code, "ru");

    let stored = ctx.container.keywords.get(keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.status, KeywordStatus::Published);
    assert_eq!(stored.result_content_id, Some(outcome.content.id));
    assert!(stored.published_at.is_some());

    let content = ctx
        .container
        .contents
        .find_by_id(outcome.content.id)
        .await
        .unwrap()
        .unwrap();
    assert!(content.is_published);

    let localized = ctx.container.localized.list_for(content.id).await.unwrap();
    assert_eq!(localized.len(), 10);
    assert!(localized.iter().all(|l| l.is_published));
    assert!(localized.iter().all(|l| l.slug == content.slug));
    assert!(!localized.iter().any(|l| l.language_code == "ru"));
    let zh = localized.iter().find(|l| l.language_code == "zh").unwrap();
    assert!(zh.title.starts_with("[zh-CN] "));
}

/// 无法解析的输出：关键词失败，不写入内容
#[tokio::test]
async fn test_malformed_output_fails_keyword_without_content() {
    let generator = ScriptedGenerator::new(vec![Ok(
        "Sorry, I cannot help with that request.".to_string()
    )]);
    let ctx = TestContext::new(generator, FakeTranslator::new()).await;
    let keyword = ctx.insert_keyword("japan esim").await;

    let err = ctx
        .container
        .pipeline
        .process_keyword(keyword.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::MalformedResponse(_)));

    let stored = ctx.container.keywords.get(keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.status, KeywordStatus::Failed);
    assert!(stored.error_message.unwrap().contains("Malformed"));
    assert!(stored.result_content_id.is_none());
    assert!(!ctx
        .container
        .contents
        .slug_exists("japan-esim")
        .await
        .unwrap());
    assert_eq!(ctx.translator.calls(), 0);
}

/// 正文过短的草稿被拒绝，错误信息指出字段
#[tokio::test]
async fn test_short_body_fails_validation() {
    let generator = ScriptedGenerator::new(vec![Ok(draft_response("Pocket WiFi", 6, 7, 400))]);
    let ctx = TestContext::new(generator, FakeTranslator::new()).await;
    let keyword = ctx.insert_keyword("pocket wifi").await;

    let err = ctx
        .container
        .pipeline
        .process_keyword(keyword.id)
        .await
        .unwrap_err();
    match err {
        PipelineError::ValidationError { field, .. } => assert_eq!(field, "body"),
        other => panic!("unexpected error: {other:?}"),
    }

    let stored = ctx.container.keywords.get(keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.status, KeywordStatus::Failed);
}

/// 失败的关键词可以重试；非失败状态的重试返回冲突
#[tokio::test]
async fn test_retry_recovers_failed_keyword() {
    let generator = ScriptedGenerator::new(vec![Ok("not json at all".to_string())]);
    let ctx = TestContext::new(generator.clone(), FakeTranslator::new()).await;
    let keyword = ctx.insert_keyword("travel esim").await;
    let pipeline = &ctx.container.pipeline;

    let conflict = pipeline.retry(keyword.id).await.unwrap_err();
    assert!(matches!(conflict, PipelineError::Conflict(_)));

    pipeline.process_keyword(keyword.id).await.unwrap_err();

    let again = pipeline.process_keyword(keyword.id).await.unwrap_err();
    assert!(matches!(again, PipelineError::Conflict(_)));

    generator.push(Ok(draft_response("Travel eSIM Explained", 5, 5, 2600)));
    let outcome = pipeline.retry(keyword.id).await.unwrap();
    assert_eq!(outcome.content.slug, "travel-esim");

    let stored = ctx.container.keywords.get(keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.status, KeywordStatus::Published);
    assert!(stored.error_message.is_none());
    assert_eq!(generator.calls(), 2);

    let published = pipeline.process_keyword(keyword.id).await.unwrap_err();
    assert!(published.to_string().contains("already published"));
}

/// 不同关键词推导出相同 slug 时追加后缀
#[tokio::test]
async fn test_colliding_slugs_get_unique_suffix() {
    let draft = draft_response("Korea SIM Card Guide", 5, 5, 2600);
    let generator = ScriptedGenerator::new(vec![Ok(draft.clone()), Ok(draft)]);
    let ctx = TestContext::new(generator, FakeTranslator::new()).await;

    let first = ctx.insert_keyword("Korea SIM card guide").await;
    let second = ctx.insert_keyword("korea sim-card guide").await;

    let a = ctx.container.pipeline.process_keyword(first.id).await.unwrap();
    let b = ctx.container.pipeline.process_keyword(second.id).await.unwrap();

    assert_eq!(a.content.slug, "korea-sim-card-guide");
    assert_ne!(b.content.slug, a.content.slug);
    assert!(b.content.slug.starts_with("korea-sim-card-guide-"));
}

/// 第二篇内容会链接到第一篇相关的已发布内容
#[tokio::test]
async fn test_related_content_is_linked() {
    let generator = ScriptedGenerator::new(vec![
        Ok(draft_response("Korea SIM Card Guide", 5, 5, 2600)),
        Ok(draft_response("Korea SIM Card Prices", 5, 5, 2600)),
    ]);
    let ctx = TestContext::new(generator, FakeTranslator::new()).await;

    let first = ctx.insert_keyword("korea sim card guide").await;
    let second = ctx.insert_keyword("korea sim card price").await;

    let a = ctx.container.pipeline.process_keyword(first.id).await.unwrap();
    let b = ctx.container.pipeline.process_keyword(second.id).await.unwrap();

    assert!(!a.content.body.contains("related-reading"));
    assert!(b.content.body.contains("related-reading"));
    assert!(b.content.body.contains(&format!("/blog/{}", a.content.slug)));
}

/// 补齐翻译只处理缺失的语言
#[tokio::test]
async fn test_translate_content_fills_only_missing_languages() {
    let generator = ScriptedGenerator::new(vec![Ok(draft_response("Japan eSIM", 5, 5, 2600))]);
    let translator = FakeTranslator::failing(&["ja", "th"]);
    let ctx = TestContext::new(generator, translator.clone()).await;
    let keyword = ctx.insert_keyword("japan esim").await;

    let outcome = ctx.container.pipeline.process_keyword(keyword.id).await.unwrap();
    assert_eq!(outcome.translations.created.len(), 9);

    translator.recover();
    let report = ctx
        .container
        .pipeline
        .translate_content(outcome.content.id)
        .await
        .unwrap();

    let mut created = report.created.clone();
    created.sort();
    assert_eq!(created, vec!["ja".to_string(), "th".to_string()]);
    assert_eq!(report.skipped.len(), 9);
    assert!(report.is_complete());

    let localized = ctx
        .container
        .localized
        .list_for(outcome.content.id)
        .await
        .unwrap();
    assert_eq!(localized.len(), 11);
}

/// 取消发布和删除作用于整个内容组
#[tokio::test]
async fn test_unpublish_and_delete_apply_to_group() {
    let generator = ScriptedGenerator::new(vec![Ok(draft_response("Pocket WiFi Rental", 5, 5, 2600))]);
    let ctx = TestContext::new(generator, FakeTranslator::new()).await;
    let keyword = ctx.insert_keyword("pocket wifi rental").await;
    let outcome = ctx.container.pipeline.process_keyword(keyword.id).await.unwrap();
    let id = outcome.content.id;

    ctx.container.pipeline.set_content_published(id, false).await.unwrap();
    let content = ctx.container.contents.find_by_id(id).await.unwrap().unwrap();
    assert!(!content.is_published);
    let localized = ctx.container.localized.list_for(id).await.unwrap();
    assert!(localized.iter().all(|l| !l.is_published));

    ctx.container.pipeline.delete_content(id).await.unwrap();
    assert!(ctx.container.contents.find_by_id(id).await.unwrap().is_none());
    assert!(ctx.container.localized.list_for(id).await.unwrap().is_empty());

    let missing = ctx.container.pipeline.delete_content(id).await.unwrap_err();
    assert!(matches!(missing, PipelineError::NotFound(_)));
}

/// 较早发布的强相关内容不会被大量更新的无关内容挤出候选集
#[tokio::test]
async fn test_old_related_content_found_behind_newer_unrelated() {
    let generator = ScriptedGenerator::new(vec![Ok(draft_response(
        "Korea SIM Card Prices",
        5,
        5,
        2600,
    ))]);
    let ctx = TestContext::new(generator, FakeTranslator::new()).await;
    let contents = &ctx.container.contents;

    let old = published_content(
        "korea-sim-card-guide",
        "Korea SIM Card Guide",
        &["korea sim card"],
        Duration::days(400),
    );
    contents.create_canonical(&old).await.unwrap();
    for i in 0..220 {
        let unrelated = published_content(
            &format!("tokyo-ramen-shops-{}", i),
            &format!("Tokyo Ramen Shops {}", i),
            &["ramen", "tokyo food"],
            Duration::days(1),
        );
        contents.create_canonical(&unrelated).await.unwrap();
    }

    let keyword = ctx.insert_keyword("korea sim card price").await;
    let outcome = ctx.container.pipeline.process_keyword(keyword.id).await.unwrap();

    assert!(outcome.content.body.contains("related-reading"));
    assert!(outcome.content.body.contains("/blog/korea-sim-card-guide"));
    assert!(!outcome.content.body.contains("tokyo-ramen-shops"));
}

/// 同一关键词的并发处理只有一方成功，另一方得到冲突且不影响最终状态
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_processing_of_one_keyword() {
    let generator = ScriptedGenerator::new(vec![
        Ok(draft_response("Japan eSIM Guide", 5, 5, 2600)),
        Ok(draft_response("Japan eSIM Guide", 5, 5, 2600)),
    ]);
    let ctx = TestContext::new(generator.clone(), FakeTranslator::new()).await;
    let keyword = ctx.insert_keyword("japan esim guide").await;

    let handles = (0..2)
        .map(|_| {
            let pipeline = ctx.container.pipeline.clone();
            let id = keyword.id;
            tokio::spawn(async move { pipeline.process_keyword(id).await })
        })
        .collect::<Vec<_>>();

    let mut succeeded = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(PipelineError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(succeeded, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(generator.calls(), 1);

    let stored = ctx.container.keywords.get(keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.status, KeywordStatus::Published);
    assert!(stored.error_message.is_none());
    assert!(stored.result_content_id.is_some());
}

/// 发布内容组失败的内容仓库，其余操作委托给真实实现
struct PublishFailingContents {
    inner: ContentRepositoryImpl,
    created: Mutex<Option<Uuid>>,
}

#[async_trait]
impl ContentRepository for PublishFailingContents {
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        self.inner.slug_exists(slug).await
    }

    async fn create_canonical(&self, content: &Content) -> Result<Content, RepositoryError> {
        let saved = self.inner.create_canonical(content).await?;
        *self.created.lock().unwrap() = Some(saved.id);
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Content>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_related(&self, terms: &[String], limit: u64) -> Result<Vec<RelatedContent>, RepositoryError> {
        self.inner.find_related(terms, limit).await
    }

    async fn set_published_group(&self, _id: Uuid, _published: bool) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Corrupt("publish rejected".to_string()))
    }

    async fn delete_group(&self, id: Uuid) -> Result<u64, RepositoryError> {
        self.inner.delete_group(id).await
    }
}

/// 发布内容组失败时删除已写入的内容和翻译，关键词置为失败
#[tokio::test]
async fn test_publish_failure_rolls_back_content_group() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;
    let contents = Arc::new(PublishFailingContents {
        inner: ContentRepositoryImpl::new(ctx.db.clone()),
        created: Mutex::new(None),
    });
    let generator = ScriptedGenerator::new(vec![Ok(draft_response("Pocket WiFi Rental", 5, 5, 2600))]);
    let pipeline = ctx.pipeline_with(generator, contents.clone());
    let keyword = ctx.insert_keyword("pocket wifi rental").await;

    let err = pipeline.process_keyword(keyword.id).await.unwrap_err();
    assert!(matches!(err, PipelineError::PersistenceFailure(_)));

    let content_id = contents.created.lock().unwrap().expect("canonical was written");
    assert!(ctx.container.contents.find_by_id(content_id).await.unwrap().is_none());
    assert!(ctx.container.localized.list_for(content_id).await.unwrap().is_empty());
    assert!(!ctx.container.contents.slug_exists("pocket-wifi-rental").await.unwrap());
    assert!(ctx.translator.calls() > 0);

    let stored = ctx.container.keywords.get(keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.status, KeywordStatus::Failed);
    assert!(stored.result_content_id.is_none());
    assert!(stored.error_message.unwrap().contains("publish rejected"));
}

/// 生成期间把关键词置为失败（例如人工取消）的生成服务
struct CancellingGenerator {
    keywords: Arc<dyn KeywordRepository>,
    keyword_id: Uuid,
    response: String,
}

#[async_trait]
impl ContentGenerator for CancellingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        let patch = TransitionPatch {
            error_message: Some("cancelled by operator".to_string()),
            result_content_id: None,
        };
        self.keywords
            .compare_and_set_status(self.keyword_id, KeywordStatus::Generating, KeywordStatus::Failed, patch)
            .await
            .unwrap();
        Ok(self.response.clone())
    }

    fn name(&self) -> &'static str {
        "cancelling"
    }
}

/// 失去关键词所有权时返回冲突：不计入失败指标，不覆盖他人写入的状态
#[tokio::test]
async fn test_lost_ownership_is_not_counted_as_failure() {
    let recorder = CounterRecorder::default();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let generator = ScriptedGenerator::new(vec![Ok("no json here".to_string())]);
    let ctx = TestContext::new(generator, FakeTranslator::new()).await;

    let broken = ctx.insert_keyword("broken keyword").await;
    ctx.container.pipeline.process_keyword(broken.id).await.unwrap_err();
    assert_eq!(recorder.count("keywords_failed_total"), 1);

    let keyword = ctx.insert_keyword("seoul subway pass").await;
    let cancelling = Arc::new(CancellingGenerator {
        keywords: ctx.container.keywords.clone(),
        keyword_id: keyword.id,
        response: draft_response("Seoul Subway Pass", 5, 5, 2600),
    });
    let pipeline = ctx.pipeline_with(cancelling, ctx.container.contents.clone());

    let err = pipeline.process_keyword(keyword.id).await.unwrap_err();
    assert!(matches!(err, PipelineError::Conflict(_)));
    assert_eq!(recorder.count("keywords_failed_total"), 1);

    let stored = ctx.container.keywords.get(keyword.id).await.unwrap().unwrap();
    assert_eq!(stored.status, KeywordStatus::Failed);
    assert_eq!(stored.error_message.as_deref(), Some("cancelled by operator"));
    assert!(stored.result_content_id.is_none());
    assert!(!ctx.container.contents.slug_exists("seoul-subway-pass").await.unwrap());
}
