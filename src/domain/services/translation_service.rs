// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::content::{Content, LocalizedContent};
use crate::domain::models::language::TargetLanguage;
use crate::domain::providers::{ProviderError, Translator};
use crate::domain::repositories::content_repository::LocalizedContentRepository;
use crate::utils::errors::{PipelineError, RepositoryError};
use crate::utils::retry_policy::RetryPolicy;
use metrics::counter;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 单个语言的翻译失败记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageFailure {
    pub language_code: String,
    pub error: String,
}

/// 翻译扇出结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FanOutReport {
    /// 本次新建的语言
    pub created: Vec<String>,
    /// 已存在而跳过的语言
    pub skipped: Vec<String>,
    /// 失败的语言
    pub failed: Vec<LanguageFailure>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 翻译扇出引擎
///
/// # 功能
///
/// 把一条规范内容依次翻译为固定的目标语言列表。每种语言独立成败：
/// 单个语言失败只记录日志并继续处理其余语言。重复执行只补齐缺失的语言。
///
/// # 节奏
///
/// 语言之间按 `inter_call_delay` 串行间隔；每次调用有独立超时和重试。
pub struct TranslationFanOut {
    translator: Arc<dyn Translator>,
    localized: Arc<dyn LocalizedContentRepository>,
    languages: Vec<TargetLanguage>,
    inter_call_delay: Duration,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl TranslationFanOut {
    pub fn new(
        translator: Arc<dyn Translator>,
        localized: Arc<dyn LocalizedContentRepository>,
        languages: Vec<TargetLanguage>,
        inter_call_delay: Duration,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            translator,
            localized,
            languages,
            inter_call_delay,
            timeout,
            retry_policy,
        }
    }

    pub fn languages(&self) -> &[TargetLanguage] {
        &self.languages
    }

    /// 对规范内容执行扇出
    ///
    /// # 返回值
    /// * `Ok(FanOutReport)` - 各语言的处理结果
    /// * `Err(PipelineError)` - 只有读取已有语言失败时返回
    pub async fn fan_out(&self, canonical: &Content) -> Result<FanOutReport, PipelineError> {
        let existing: HashSet<String> = self
            .localized
            .existing_languages(canonical.id)
            .await?
            .into_iter()
            .collect();

        let mut report = FanOutReport::default();
        let mut called = false;

        for language in &self.languages {
            let code = language.storage_code;
            if existing.contains(code) {
                report.skipped.push(code.to_string());
                continue;
            }

            if called && !self.inter_call_delay.is_zero() {
                tokio::time::sleep(self.inter_call_delay).await;
            }
            called = true;

            match self.translate_language(canonical, language).await {
                Ok(localized) => match self.localized.insert(&localized).await {
                    Ok(_) => {
                        counter!("translations_created_total", "language" => code).increment(1);
                        report.created.push(code.to_string());
                    }
                    Err(RepositoryError::Duplicate(_)) => {
                        info!(content_id = %canonical.id, language = code, "Translation inserted concurrently, skipping");
                        report.skipped.push(code.to_string());
                    }
                    Err(e) => self.record_failure(&mut report, canonical, code, e.to_string()),
                },
                Err(e) => self.record_failure(&mut report, canonical, code, e.to_string()),
            }
        }

        info!(
            content_id = %canonical.id,
            created = report.created.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Translation fan-out finished"
        );
        Ok(report)
    }

    fn record_failure(&self, report: &mut FanOutReport, canonical: &Content, code: &'static str, error: String) {
        warn!(content_id = %canonical.id, language = code, "Translation failed: {}", error);
        counter!("translations_failed_total", "language" => code).increment(1);
        report.failed.push(LanguageFailure {
            language_code: code.to_string(),
            error,
        });
    }

    async fn translate_language(
        &self,
        canonical: &Content,
        language: &TargetLanguage,
    ) -> Result<LocalizedContent, ProviderError> {
        let tag = language.provider_tag;
        let title = self.translate_field(&canonical.title, tag).await?;
        let excerpt = self.translate_field(&canonical.excerpt, tag).await?;
        let body = self.translate_field(&canonical.body, tag).await?;

        Ok(LocalizedContent::from_canonical(
            canonical,
            language.storage_code,
            title,
            excerpt,
            body,
        ))
    }

    async fn translate_field(&self, text: &str, tag: &str) -> Result<String, ProviderError> {
        let provider = self.translator.name();
        let operation = format!("translate:{}", tag);

        self.retry_policy
            .run(&operation, || {
                let translator = Arc::clone(&self.translator);
                let timeout = self.timeout;
                async move {
                    match tokio::time::timeout(timeout, translator.translate(text, tag)).await {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::timeout(provider, timeout)),
                    }
                }
            })
            .await
    }
}

#[cfg(test)]
#[path = "translation_service_test.rs"]
mod tests;
