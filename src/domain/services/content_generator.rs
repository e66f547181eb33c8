// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::PipelineSettings;
use crate::domain::models::draft::GeneratedContentDraft;
use crate::domain::providers::{ContentGenerator, ProviderError};
use crate::utils::errors::PipelineError;
use crate::utils::retry_policy::RetryPolicy;
use crate::utils::text_processing::truncate_with_ellipsis;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const FENCE: &str = "```";

/// 带 json 标签的代码块起始（标签大小写不敏感）
static OPEN_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)```json[ \t]*").unwrap());

/// 生成请求
///
/// 关键词及可选的 SEO 提示
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub keyword: String,
    pub search_intent: Option<String>,
    pub estimated_value: Option<f64>,
    pub related_terms: Vec<String>,
}

/// 草稿校验规则
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub min_body_chars: usize,
    pub min_headings: usize,
    pub min_keywords: usize,
    pub max_title_chars: usize,
    pub max_excerpt_chars: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

impl From<&PipelineSettings> for ValidationRules {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            min_body_chars: settings.min_body_chars,
            min_headings: settings.min_headings,
            min_keywords: settings.min_keywords,
            max_title_chars: settings.max_title_chars,
            max_excerpt_chars: settings.max_excerpt_chars,
        }
    }
}

/// 内容生成适配器
///
/// # 功能
///
/// 封装生成式内容服务：构建提示词、带超时和重试地调用服务、
/// 从不规则的响应中提取结构化草稿，并执行校验和字段规范化。
///
/// 该适配器不做任何持久化。
pub struct ContentGeneratorAdapter {
    generator: Arc<dyn ContentGenerator>,
    rules: ValidationRules,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl ContentGeneratorAdapter {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        rules: ValidationRules,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            rules,
            timeout,
            retry_policy,
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// 生成并校验草稿
    ///
    /// # 参数
    /// * `request` - 关键词与 SEO 提示
    ///
    /// # 返回值
    /// * `Ok(GeneratedContentDraft)` - 已校验、已规范化的草稿
    /// * `Err(PipelineError)` - `ProviderFailure`、`MalformedResponse` 或 `ValidationError`
    pub async fn generate_draft(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContentDraft, PipelineError> {
        let prompt = build_prompt(request, &self.rules);
        let provider = self.generator.name();

        info!(keyword = %request.keyword, provider, "Requesting content generation");

        let raw = self
            .retry_policy
            .run("content_generation", || {
                let generator = Arc::clone(&self.generator);
                let prompt = prompt.as_str();
                let timeout = self.timeout;
                async move {
                    match tokio::time::timeout(timeout, generator.generate(prompt)).await {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::timeout(provider, timeout)),
                    }
                }
            })
            .await?;

        debug!(keyword = %request.keyword, response_chars = raw.chars().count(), "Received generation response");

        let draft = parse_draft(&raw)?;
        validate_and_normalize(draft, &self.rules)
    }
}

/// 构建生成提示词
///
/// 提示词要求服务只输出一个 JSON 对象，并写明各项下限。
pub fn build_prompt(request: &GenerationRequest, rules: &ValidationRules) -> String {
    let mut hints = Vec::new();
    if let Some(intent) = request.search_intent.as_deref().filter(|s| !s.trim().is_empty()) {
        hints.push(format!("Search intent: {}", intent.trim()));
    }
    if let Some(value) = request.estimated_value.filter(|v| *v > 0.0) {
        hints.push(format!("Estimated commercial value (CPC): {:.2}", value));
    }
    if !request.related_terms.is_empty() {
        hints.push(format!("Related terms to cover: {}", request.related_terms.join(", ")));
    }
    let hints = if hints.is_empty() {
        String::new()
    } else {
        format!("\n{}\n", hints.join("\n"))
    };

    format!(
        "Write a long-form, search-optimized blog article for the keyword \"{keyword}\".\n\
        {hints}\n\
        Requirements:\n\
        - The body is HTML using <h2>/<h3>, <p>, <ul> and <table> where useful, at least {min_body} characters.\n\
        - Include at least {min_headings} section headings and list them in \"headings\".\n\
        - Provide at least {min_keywords} SEO keywords in \"keywords\".\n\
        - The title is at most {max_title} characters, the excerpt at most {max_excerpt} characters.\n\
        - \"slug\" is a short lowercase hyphenated URL slug in English.\n\
        - \"thumbnail_hint\" describes a suitable cover image in a few words.\n\n\
        Respond with ONLY one JSON object in a ```json fenced block, with exactly these fields:\n\
        {{\"title\": string, \"excerpt\": string, \"body\": string, \"headings\": [string], \
        \"keywords\": [string], \"slug\": string, \"thumbnail_hint\": string}}",
        keyword = request.keyword.trim(),
        hints = hints,
        min_body = rules.min_body_chars,
        min_headings = rules.min_headings,
        min_keywords = rules.min_keywords,
        max_title = rules.max_title_chars,
        max_excerpt = rules.max_excerpt_chars,
    )
}

/// 从原始响应中提取草稿
///
/// 依次尝试：完整的代码块、缺少结束标记的代码块、首个 `{` 到最后一个 `}` 的片段。
/// 第一个能解析为 JSON 对象的候选即为结果。
pub fn parse_draft(raw: &str) -> Result<GeneratedContentDraft, PipelineError> {
    let candidates = [fenced_block(raw), unterminated_fence(raw), brace_slice(raw)];

    for candidate in candidates.into_iter().flatten() {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) if value.is_object() => {
                return serde_json::from_value::<GeneratedContentDraft>(value).map_err(|e| {
                    PipelineError::MalformedResponse(format!("unexpected field types: {}", e))
                });
            }
            Ok(_) => debug!("Candidate payload is not a JSON object"),
            Err(e) => debug!("Candidate payload failed to parse: {}", e),
        }
    }

    warn!(response_chars = raw.chars().count(), "No structured payload found in generation response");
    Err(PipelineError::MalformedResponse(
        "no JSON object found in provider response".to_string(),
    ))
}

fn open_fence(raw: &str) -> Option<usize> {
    OPEN_FENCE.find(raw).map(|m| m.end())
}

fn fenced_block(raw: &str) -> Option<&str> {
    let start = open_fence(raw)?;
    let rest = &raw[start..];
    let end = rest.find(FENCE)?;
    Some(rest[..end].trim())
}

fn unterminated_fence(raw: &str) -> Option<&str> {
    let start = open_fence(raw)?;
    let tail = raw[start..]
        .trim_end()
        .trim_end_matches('`')
        .trim_end();
    Some(tail.trim())
}

fn brace_slice(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// 校验草稿并规范化字段
///
/// 标题和摘要超长时截断，列表字段去除空项；违反下限时返回指明字段的 `ValidationError`。
pub fn validate_and_normalize(
    draft: GeneratedContentDraft,
    rules: &ValidationRules,
) -> Result<GeneratedContentDraft, PipelineError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(PipelineError::validation("title", "is empty"));
    }
    let body = draft.body.trim();
    if body.is_empty() {
        return Err(PipelineError::validation("body", "is empty"));
    }
    let excerpt = draft.excerpt.trim();
    if excerpt.is_empty() {
        return Err(PipelineError::validation("excerpt", "is empty"));
    }

    let body_chars = body.chars().count();
    if body_chars < rules.min_body_chars {
        return Err(PipelineError::validation(
            "body",
            format!(
                "has {} characters, minimum is {}",
                body_chars, rules.min_body_chars
            ),
        ));
    }

    let headings = clean_list(draft.headings);
    if headings.len() < rules.min_headings {
        return Err(PipelineError::validation(
            "headings",
            format!("has {} entries, minimum is {}", headings.len(), rules.min_headings),
        ));
    }

    let keywords = dedup_case_insensitive(clean_list(draft.keywords));
    if keywords.len() < rules.min_keywords {
        return Err(PipelineError::validation(
            "keywords",
            format!("has {} entries, minimum is {}", keywords.len(), rules.min_keywords),
        ));
    }

    Ok(GeneratedContentDraft {
        title: truncate_with_ellipsis(title, rules.max_title_chars),
        excerpt: truncate_with_ellipsis(excerpt, rules.max_excerpt_chars),
        body: body.to_string(),
        headings,
        keywords,
        slug_suggestion: draft
            .slug_suggestion
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        thumbnail_hint: draft
            .thumbnail_hint
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

#[cfg(test)]
#[path = "content_generator_test.rs"]
mod tests;
