// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::content::Content;
use crate::domain::models::keyword::{Keyword, KeywordEvent, KeywordStatus};
use crate::domain::models::scheduler::{ItemResult, RunSummary};
use crate::domain::repositories::content_repository::ContentRepository;
use crate::domain::repositories::keyword_repository::{KeywordRepository, TransitionPatch};
use crate::domain::services::content_generator::{ContentGeneratorAdapter, GenerationRequest};
use crate::domain::services::seo_finalizer::{unique_suffix, SeoFinalizer};
use crate::domain::services::translation_service::{FanOutReport, TranslationFanOut};
use crate::utils::errors::{PipelineError, RepositoryError};
use crate::utils::slug::with_suffix;
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// 单个关键词处理成功的结果
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub keyword_id: Uuid,
    pub content: Content,
    pub translations: FanOutReport,
}

/// 流水线编排服务
///
/// # 功能
///
/// 按关键词驱动完整流程：领取（pending → generating）、生成与校验、SEO 定稿、
/// 持久化规范内容、翻译扇出、发布（generating → published）。
/// 任何不可恢复的错误都会把关键词置为 failed 并记录原因。
///
/// # 并发
///
/// 关键词行是唯一的共享可变资源。所有状态写入都是比较并设置：
/// 竞争失败的一方得到 `Conflict`，不会静默重试。
pub struct PipelineService {
    keywords: Arc<dyn KeywordRepository>,
    contents: Arc<dyn ContentRepository>,
    generator: ContentGeneratorAdapter,
    seo: SeoFinalizer,
    fan_out: TranslationFanOut,
}

impl PipelineService {
    pub fn new(
        keywords: Arc<dyn KeywordRepository>,
        contents: Arc<dyn ContentRepository>,
        generator: ContentGeneratorAdapter,
        seo: SeoFinalizer,
        fan_out: TranslationFanOut,
    ) -> Self {
        Self {
            keywords,
            contents,
            generator,
            seo,
            fan_out,
        }
    }

    pub fn keywords(&self) -> &Arc<dyn KeywordRepository> {
        &self.keywords
    }

    async fn load_keyword(&self, id: Uuid) -> Result<Keyword, PipelineError> {
        self.keywords
            .get(id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("keyword {}", id)))
    }

    /// 检查状态机并执行比较并设置
    async fn apply_event(
        &self,
        keyword: &Keyword,
        event: KeywordEvent,
        patch: TransitionPatch,
    ) -> Result<KeywordStatus, PipelineError> {
        let expected = event.source_status();
        let next = expected.transition(event)?;

        if keyword.status != expected {
            return Err(conflict_for(keyword.id, keyword.status, event));
        }

        let applied = self
            .keywords
            .compare_and_set_status(keyword.id, expected, next, patch)
            .await?;
        if !applied {
            warn!(keyword_id = %keyword.id, %event, "Lost status race");
            return Err(PipelineError::Conflict(format!(
                "keyword {} is no longer {}",
                keyword.id, expected
            )));
        }
        Ok(next)
    }

    /// 处理单个关键词
    ///
    /// # 参数
    /// * `id` - 关键词ID，必须处于 pending
    ///
    /// # 返回值
    /// * `Ok(ProcessOutcome)` - 内容已发布
    /// * `Err(PipelineError::NotFound | Conflict)` - 未领取，关键词状态未改变
    /// * `Err(..)` - 其他错误，关键词已置为 failed
    #[instrument(skip(self))]
    pub async fn process_keyword(&self, id: Uuid) -> Result<ProcessOutcome, PipelineError> {
        let keyword = self.load_keyword(id).await?;
        self.apply_event(&keyword, KeywordEvent::StartGeneration, TransitionPatch::default())
            .await?;

        info!(keyword = %keyword.text, priority = %keyword.priority, "Keyword claimed for generation");
        let started = Instant::now();

        let result = self.run_stages(&keyword).await;
        histogram!("pipeline_duration_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok(outcome) => {
                counter!("keywords_generated_total").increment(1);
                info!(
                    slug = %outcome.content.slug,
                    translations = outcome.translations.created.len(),
                    "Keyword published"
                );
                Ok(outcome)
            }
            // 竞争失败：关键词已由另一方推进，既不记失败也不计数
            Err(err @ PipelineError::Conflict(_)) => {
                warn!(keyword = %keyword.text, "Pipeline lost keyword ownership: {}", err);
                Err(err)
            }
            Err(err) => {
                counter!("keywords_failed_total", "kind" => err.kind()).increment(1);
                error!(keyword = %keyword.text, "Pipeline failed: {}", err);
                self.mark_failed(&keyword, &err).await;
                Err(err)
            }
        }
    }

    async fn run_stages(&self, keyword: &Keyword) -> Result<ProcessOutcome, PipelineError> {
        let request = GenerationRequest {
            keyword: keyword.text.clone(),
            search_intent: keyword.search_intent.clone(),
            estimated_value: Some(keyword.estimated_value),
            related_terms: keyword.related_terms.clone(),
        };
        let draft = self.generator.generate_draft(&request).await?;

        let slug = self.seo.derive_slug(&draft, &keyword.text).await?;
        let related = self
            .seo
            .find_related(&keyword.text, &keyword.related_terms, None)
            .await?;
        let content = self.seo.assemble(draft, slug, &related);

        let content = self.persist_canonical(content).await?;

        let translations = match self.fan_out.fan_out(&content).await {
            Ok(report) => report,
            Err(e) => {
                warn!(content_id = %content.id, "Translation fan-out aborted: {}", e);
                FanOutReport::default()
            }
        };

        let content = self.publish(keyword, content).await?;

        Ok(ProcessOutcome {
            keyword_id: keyword.id,
            content,
            translations,
        })
    }

    /// 在独立事务中写入规范内容，slug 冲突时换一个后缀重试一次
    async fn persist_canonical(&self, content: Content) -> Result<Content, PipelineError> {
        match self.contents.create_canonical(&content).await {
            Ok(saved) => Ok(saved),
            Err(RepositoryError::Duplicate(detail)) => {
                warn!(slug = %content.slug, "Slug taken at insert time ({}), retrying with suffix", detail);
                let slug = with_suffix(&content.slug, &unique_suffix());
                let mut retry = content;
                retry.seo_meta.slug = slug.clone();
                retry.slug = slug;
                Ok(self.contents.create_canonical(&retry).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 发布内容组并把关键词置为 published
    ///
    /// 任一步骤失败都会删除刚写入的内容组，保证不会留下未关联的内容。
    async fn publish(&self, keyword: &Keyword, mut content: Content) -> Result<Content, PipelineError> {
        if let Err(e) = self.contents.set_published_group(content.id, true).await {
            self.compensate(content.id).await;
            return Err(e.into());
        }

        let patch = TransitionPatch {
            error_message: None,
            result_content_id: Some(content.id),
        };
        let mut generating = keyword.clone();
        generating.status = KeywordStatus::Generating;

        match self.apply_event(&generating, KeywordEvent::Publish, patch).await {
            Ok(_) => {
                content.is_published = true;
                Ok(content)
            }
            Err(e) => {
                self.compensate(content.id).await;
                Err(e)
            }
        }
    }

    async fn compensate(&self, content_id: Uuid) {
        match self.contents.delete_group(content_id).await {
            Ok(rows) => warn!(%content_id, rows, "Rolled back canonical content"),
            Err(e) => error!(%content_id, "Failed to roll back canonical content: {}", e),
        }
    }

    async fn mark_failed(&self, keyword: &Keyword, err: &PipelineError) {
        let patch = TransitionPatch {
            error_message: Some(err.to_string()),
            result_content_id: None,
        };
        let mut generating = keyword.clone();
        generating.status = KeywordStatus::Generating;

        if let Err(e) = self.apply_event(&generating, KeywordEvent::Fail, patch).await {
            error!(keyword_id = %keyword.id, "Could not record failure: {}", e);
        }
    }

    /// 重试失败的关键词
    ///
    /// 只有 failed 状态可以重试：清空错误信息回到 pending，随后立即重新处理。
    #[instrument(skip(self))]
    pub async fn retry(&self, id: Uuid) -> Result<ProcessOutcome, PipelineError> {
        let keyword = self.load_keyword(id).await?;
        self.apply_event(&keyword, KeywordEvent::Retry, TransitionPatch::default())
            .await?;
        info!(keyword = %keyword.text, "Keyword reset to pending for retry");
        self.process_keyword(id).await
    }

    /// 按优先级依次处理待处理关键词
    ///
    /// 单个关键词失败不会中断本批次。
    pub async fn process_pending(&self, limit: u64) -> Result<RunSummary, PipelineError> {
        let pending = self.keywords.fetch_pending(limit).await?;
        let mut summary = RunSummary::default();

        info!(count = pending.len(), "Processing pending keywords");
        for keyword in pending {
            let item = match self.process_keyword(keyword.id).await {
                Ok(outcome) => ItemResult {
                    keyword_id: keyword.id,
                    keyword: keyword.text.clone(),
                    succeeded: true,
                    content_id: Some(outcome.content.id),
                    slug: Some(outcome.content.slug.clone()),
                    translations_created: outcome.translations.created.len(),
                    translations_failed: outcome.translations.failed.len(),
                    error: None,
                },
                Err(e) => ItemResult {
                    keyword_id: keyword.id,
                    keyword: keyword.text.clone(),
                    succeeded: false,
                    content_id: None,
                    slug: None,
                    translations_created: 0,
                    translations_failed: 0,
                    error: Some(e.to_string()),
                },
            };
            summary.record(item);
        }

        Ok(summary)
    }

    /// 为已有规范内容补齐缺失的翻译
    pub async fn translate_content(&self, content_id: Uuid) -> Result<FanOutReport, PipelineError> {
        let content = self
            .contents
            .find_by_id(content_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("content {}", content_id)))?;
        self.fan_out.fan_out(&content).await
    }

    /// 在同一事务中设置规范内容及全部翻译的发布状态
    pub async fn set_content_published(&self, content_id: Uuid, published: bool) -> Result<u64, PipelineError> {
        let rows = self.contents.set_published_group(content_id, published).await?;
        if rows == 0 {
            return Err(PipelineError::NotFound(format!("content {}", content_id)));
        }
        Ok(rows)
    }

    /// 在同一事务中删除规范内容及全部翻译
    pub async fn delete_content(&self, content_id: Uuid) -> Result<u64, PipelineError> {
        let rows = self.contents.delete_group(content_id).await?;
        if rows == 0 {
            return Err(PipelineError::NotFound(format!("content {}", content_id)));
        }
        Ok(rows)
    }
}

fn conflict_for(id: Uuid, status: KeywordStatus, event: KeywordEvent) -> PipelineError {
    let reason = match (status, event) {
        (KeywordStatus::Generating, KeywordEvent::StartGeneration) => "is already generating".to_string(),
        (KeywordStatus::Published, KeywordEvent::StartGeneration) => "is already published".to_string(),
        (KeywordStatus::Failed, KeywordEvent::StartGeneration) => {
            "has failed and must be retried explicitly".to_string()
        }
        (status, KeywordEvent::Retry) => format!("is {}, only failed keywords can be retried", status),
        (status, event) => format!("is {}, cannot apply {}", status, event),
    };
    PipelineError::Conflict(format!("keyword {} {}", id, reason))
}
