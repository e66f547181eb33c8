// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::models::language::TARGET_LANGUAGES;
use crate::domain::models::scheduler::SchedulerSettings;
use crate::domain::providers::{ContentGenerator, KeywordSuggester, Translator};
use crate::domain::repositories::content_repository::{
    ContentRepository, LocalizedContentRepository,
};
use crate::domain::repositories::keyword_repository::KeywordRepository;
use crate::domain::repositories::scheduler_settings_repository::SchedulerSettingsRepository;
use crate::domain::services::content_generator::{ContentGeneratorAdapter, ValidationRules};
use crate::domain::services::keyword_research_service::KeywordResearchService;
use crate::domain::services::pipeline_service::PipelineService;
use crate::domain::services::seo_finalizer::SeoFinalizer;
use crate::domain::services::translation_service::TranslationFanOut;
use crate::infrastructure::providers::google_suggest::GoogleSuggestClient;
use crate::infrastructure::providers::google_translator::GoogleTranslator;
use crate::infrastructure::providers::openai_generator::OpenAiGenerator;
use crate::infrastructure::repositories::content_repo_impl::{
    ContentRepositoryImpl, LocalizedContentRepositoryImpl,
};
use crate::infrastructure::repositories::keyword_repo_impl::KeywordRepositoryImpl;
use crate::infrastructure::repositories::scheduler_settings_repo_impl::SchedulerSettingsRepositoryImpl;
use crate::queue::scheduler::{PipelineScheduler, ReplenishPolicy};
use crate::utils::retry_policy::RetryPolicy;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// 外部服务集合
#[derive(Clone)]
pub struct Providers {
    pub generator: Arc<dyn ContentGenerator>,
    pub translator: Arc<dyn Translator>,
    pub suggester: Arc<dyn KeywordSuggester>,
}

impl Providers {
    /// 按配置创建 HTTP 客户端
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            generator: Arc::new(OpenAiGenerator::new(&settings.llm)),
            translator: Arc::new(GoogleTranslator::new(&settings.translation)),
            suggester: Arc::new(GoogleSuggestClient::new(&settings.suggestion)),
        }
    }
}

/// 应用服务容器
///
/// 组装仓库、外部服务和领域服务，供 HTTP 层和调度器共享
#[derive(Clone)]
pub struct AppContainer {
    pub keywords: Arc<dyn KeywordRepository>,
    pub contents: Arc<dyn ContentRepository>,
    pub localized: Arc<dyn LocalizedContentRepository>,
    pub pipeline: Arc<PipelineService>,
    pub research: Arc<KeywordResearchService>,
    pub scheduler: Arc<PipelineScheduler>,
}

impl AppContainer {
    /// 创建服务容器
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    /// * `db` - 数据库连接
    /// * `providers` - 外部服务实现
    pub fn build(settings: &Settings, db: Arc<DatabaseConnection>, providers: Providers) -> Self {
        let keywords: Arc<dyn KeywordRepository> = Arc::new(KeywordRepositoryImpl::new(db.clone()));
        let contents: Arc<dyn ContentRepository> = Arc::new(ContentRepositoryImpl::new(db.clone()));
        let localized: Arc<dyn LocalizedContentRepository> =
            Arc::new(LocalizedContentRepositoryImpl::new(db.clone()));
        let settings_repo: Arc<dyn SchedulerSettingsRepository> =
            Arc::new(SchedulerSettingsRepositoryImpl::new(db));

        let retry_policy = RetryPolicy::with_max_retries(settings.pipeline.retry_max_attempts);

        let generator = ContentGeneratorAdapter::new(
            providers.generator,
            ValidationRules::from(&settings.pipeline),
            settings.llm.timeout(),
            retry_policy.clone(),
        );
        let seo = SeoFinalizer::new(contents.clone(), settings.pipeline.related_limit);
        let fan_out = TranslationFanOut::new(
            providers.translator,
            localized.clone(),
            TARGET_LANGUAGES.to_vec(),
            settings.translation.inter_call_delay(),
            settings.translation.timeout(),
            retry_policy,
        );

        let pipeline = Arc::new(PipelineService::new(
            keywords.clone(),
            contents.clone(),
            generator,
            seo,
            fan_out,
        ));

        let research = Arc::new(KeywordResearchService::new(
            providers.suggester,
            keywords.clone(),
            settings.research.suggestion_seed_limit,
            settings.research.modifiers_per_seed,
            settings.suggestion.timeout(),
        ));

        let scheduler = Arc::new(PipelineScheduler::new(
            settings_repo,
            pipeline.clone(),
            research.clone(),
            SchedulerSettings {
                enabled: settings.scheduler.enabled,
                items_per_run: settings.scheduler.items_per_run,
                last_run_at: None,
                version: 0,
            },
            ReplenishPolicy {
                min_pending: settings.research.min_pending,
                count: settings.research.replenish_count,
            },
        ));

        Self {
            keywords,
            contents,
            localized,
            pipeline,
            research,
            scheduler,
        }
    }
}
