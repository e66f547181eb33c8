// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use contentrs::application::container::{AppContainer, Providers};
use contentrs::config::settings::Settings;
use contentrs::domain::models::content::{Content, SeoMeta};
use contentrs::domain::models::keyword::{Keyword, KeywordPriority};
use contentrs::domain::models::language::TARGET_LANGUAGES;
use contentrs::domain::providers::{ContentGenerator, KeywordSuggester, ProviderError, Translator};
use contentrs::domain::repositories::content_repository::ContentRepository;
use contentrs::domain::repositories::keyword_repository::{KeywordRepository, NewKeyword};
use contentrs::domain::services::content_generator::{ContentGeneratorAdapter, ValidationRules};
use contentrs::domain::services::pipeline_service::PipelineService;
use contentrs::domain::services::seo_finalizer::SeoFinalizer;
use contentrs::domain::services::translation_service::TranslationFanOut;
use contentrs::infrastructure::database::connection;
use contentrs::presentation::routes;
use contentrs::utils::retry_policy::RetryPolicy;
use metrics::{
    Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 测试配置：内存数据库、不重试、翻译无间隔、不自动补充关键词
pub fn test_settings() -> Settings {
    Settings::builder()
        .unwrap()
        .set_override("database.url", "sqlite::memory:")
        .unwrap()
        .set_override("translation.inter_call_delay_ms", 0)
        .unwrap()
        .set_override("pipeline.retry_max_attempts", 0)
        .unwrap()
        .set_override("research.min_pending", 0)
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
}

pub async fn setup_db(settings: &Settings) -> Arc<DatabaseConnection> {
    let db = connection::create_pool(&settings.database).await.unwrap();
    connection::run_migrations(&db).await.unwrap();
    Arc::new(db)
}

/// 按顺序返回预设结果的生成服务
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn push(&self, response: Result<String, ProviderError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::InvalidResponse {
                    provider: "scripted",
                    message: "script exhausted".to_string(),
                })
            })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// 给文本加上语言前缀的翻译服务，可指定失败的语言
pub struct FakeTranslator {
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl FakeTranslator {
    pub fn new() -> Arc<Self> {
        Self::failing(&[])
    }

    pub fn failing(tags: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: Mutex::new(tags.iter().map(|t| t.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, target_language_tag: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(target_language_tag) {
            return Err(ProviderError::Http {
                provider: "fake-translate",
                status: 400,
                body: format!("unsupported target {}", target_language_tag),
            });
        }
        Ok(format!("[{}] {}", target_language_tag, text))
    }

    fn name(&self) -> &'static str {
        "fake-translate"
    }
}

/// 每个种子返回一条 "<seed> tips" 联想
pub struct FakeSuggester;

#[async_trait]
impl KeywordSuggester for FakeSuggester {
    async fn suggest(&self, seed_phrase: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec![format!("{} tips", seed_phrase)])
    }

    fn name(&self) -> &'static str {
        "fake-suggest"
    }
}

/// 构造一段生成服务的原始输出（带 json 代码块）
pub fn draft_response(title: &str, headings: usize, keywords: usize, body_chars: usize) -> String {
    let heading_list = (1..=headings)
        .map(|i| format!("Section {}", i))
        .collect::<Vec<_>>();
    let keyword_list = (1..=keywords)
        .map(|i| format!("keyword {}", i))
        .collect::<Vec<_>>();

    let mut body = String::new();
    for heading in &heading_list {
        body.push_str(&format!("<h2>{}</h2><p>", heading));
        body.push_str("Prepaid plans and eSIM options explained. ");
        body.push_str("</p>");
    }
    while body.chars().count() < body_chars {
        body.push_str("<p>Coverage, pricing and activation steps for travelers.</p>");
    }

    let draft = json!({
        "title": title,
        "excerpt": format!("Everything about {}", title),
        "body": body,
        "headings": heading_list,
        "keywords": keyword_list,
    });
    format!("Here is the article:\n```json\n{}\n```", draft)
}

/// 构造一条 `age` 之前发布的规范内容
pub fn published_content(slug: &str, title: &str, keywords: &[&str], age: Duration) -> Content {
    let published_at: DateTime<FixedOffset> = (Utc::now() - age).into();
    let keywords = keywords.iter().map(|k| k.to_string()).collect::<Vec<_>>();
    let headings = vec!["Overview".to_string(), "Tips".to_string()];
    Content {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: title.to_string(),
        excerpt: format!("About {}", title),
        body: format!("<p>{}</p>", title),
        headings: headings.clone(),
        keywords: keywords.clone(),
        thumbnail_url: None,
        seo_meta: SeoMeta {
            headings,
            keywords,
            slug: slug.to_string(),
            thumbnail_hint: None,
        },
        is_published: true,
        published_at: Some(published_at),
        created_at: published_at,
        updated_at: published_at,
    }
}

#[allow(dead_code)]
pub struct TestContext {
    pub settings: Arc<Settings>,
    pub db: Arc<DatabaseConnection>,
    pub container: AppContainer,
    pub generator: Arc<ScriptedGenerator>,
    pub translator: Arc<FakeTranslator>,
}

impl TestContext {
    pub async fn new(generator: Arc<ScriptedGenerator>, translator: Arc<FakeTranslator>) -> Self {
        Self::with_settings(test_settings(), generator, translator).await
    }

    pub async fn with_settings(
        settings: Settings,
        generator: Arc<ScriptedGenerator>,
        translator: Arc<FakeTranslator>,
    ) -> Self {
        let db = setup_db(&settings).await;
        let providers = Providers {
            generator: generator.clone(),
            translator: translator.clone(),
            suggester: Arc::new(FakeSuggester),
        };
        let container = AppContainer::build(&settings, db.clone(), providers);

        Self {
            settings: Arc::new(settings),
            db,
            container,
            generator,
            translator,
        }
    }

    pub async fn insert_keyword(&self, text: &str) -> Keyword {
        self.insert_keyword_with(text, KeywordPriority::Medium).await
    }

    pub async fn insert_keyword_with(&self, text: &str, priority: KeywordPriority) -> Keyword {
        self.container
            .keywords
            .insert_if_absent(NewKeyword {
                text: text.to_string(),
                priority,
                ..Default::default()
            })
            .await
            .unwrap()
            .expect("keyword should be new")
    }

    /// 用指定的生成服务和内容仓库组装一条流水线，其余依赖与容器共用
    pub fn pipeline_with(
        &self,
        generator: Arc<dyn ContentGenerator>,
        contents: Arc<dyn ContentRepository>,
    ) -> Arc<PipelineService> {
        let settings = &self.settings;
        let generator = ContentGeneratorAdapter::new(
            generator,
            ValidationRules::from(&settings.pipeline),
            settings.llm.timeout(),
            RetryPolicy::none(),
        );
        let seo = SeoFinalizer::new(contents.clone(), settings.pipeline.related_limit);
        let fan_out = TranslationFanOut::new(
            self.translator.clone(),
            self.container.localized.clone(),
            TARGET_LANGUAGES.to_vec(),
            settings.translation.inter_call_delay(),
            settings.translation.timeout(),
            RetryPolicy::none(),
        );

        Arc::new(PipelineService::new(
            self.container.keywords.clone(),
            contents,
            generator,
            seo,
            fan_out,
        ))
    }

    pub fn server(&self) -> TestServer {
        let app = routes::app(self.container.clone(), self.settings.clone());
        TestServer::new(app).unwrap()
    }
}

/// 只统计计数器的指标记录器，按指标名汇总（忽略标签）
///
/// 配合 `metrics::set_default_local_recorder` 使用，仅对当前线程生效，
/// 因此只适用于单线程运行时的测试。
#[derive(Default)]
pub struct CounterRecorder {
    counters: Arc<Mutex<HashMap<String, u64>>>,
}

impl CounterRecorder {
    pub fn count(&self, name: &str) -> u64 {
        self.counters.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

struct CounterHandle {
    name: String,
    counters: Arc<Mutex<HashMap<String, u64>>>,
}

impl CounterFn for CounterHandle {
    fn increment(&self, value: u64) {
        *self
            .counters
            .lock()
            .unwrap()
            .entry(self.name.clone())
            .or_default() += value;
    }

    fn absolute(&self, value: u64) {
        self.counters
            .lock()
            .unwrap()
            .insert(self.name.clone(), value);
    }
}

impl Recorder for CounterRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CounterHandle {
            name: key.name().to_string(),
            counters: self.counters.clone(),
        }))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}
