// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::content::{Content, RelatedContent, SeoMeta};
use crate::domain::models::draft::GeneratedContentDraft;
use crate::domain::repositories::content_repository::ContentRepository;
use crate::utils::errors::PipelineError;
use crate::utils::slug::{slugify, with_suffix};
use crate::utils::text_processing::tokenize;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 数据库预筛后参与排序的候选数量上限
const RELATED_CANDIDATE_POOL: u64 = 200;
/// 生成唯一 slug 的最大尝试次数
const MAX_SLUG_ATTEMPTS: usize = 5;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "from", "in", "is", "of", "on", "or", "the", "to", "vs",
    "with", "your", "how", "what",
];

/// SEO 定稿服务
///
/// 为草稿分配唯一 slug、查找已发布的相关内容并插入内链。
pub struct SeoFinalizer {
    contents: Arc<dyn ContentRepository>,
    related_limit: usize,
}

impl SeoFinalizer {
    pub fn new(contents: Arc<dyn ContentRepository>, related_limit: usize) -> Self {
        Self {
            contents,
            related_limit,
        }
    }

    /// 推导唯一 slug
    ///
    /// 优先使用草稿建议的 slug，其次是关键词，最后是标题。
    /// 冲突时追加高精度时间戳后缀；数据库唯一约束仍是最终裁决。
    pub async fn derive_slug(
        &self,
        draft: &GeneratedContentDraft,
        keyword_text: &str,
    ) -> Result<String, PipelineError> {
        let base = base_slug(draft, keyword_text)
            .ok_or_else(|| PipelineError::validation("slug", "cannot be derived from draft or keyword"))?;

        if !self.contents.slug_exists(&base).await? {
            return Ok(base);
        }

        for _ in 0..MAX_SLUG_ATTEMPTS {
            let candidate = with_suffix(&base, &unique_suffix());
            if !self.contents.slug_exists(&candidate).await? {
                info!(base = %base, slug = %candidate, "Slug collision resolved with suffix");
                return Ok(candidate);
            }
        }

        Err(PipelineError::PersistenceFailure(format!(
            "could not find a free slug for '{}'",
            base
        )))
    }

    /// 查找相关的已发布内容
    ///
    /// # 参数
    /// * `keyword_text` - 关键词
    /// * `related_terms` - 关键词附带的相关词提示
    /// * `exclude` - 排除的内容 ID（通常是当前内容自身）
    ///
    /// # 返回值
    /// 按匹配度、发布时间降序排列，最多 `related_limit` 条
    pub async fn find_related(
        &self,
        keyword_text: &str,
        related_terms: &[String],
        exclude: Option<Uuid>,
    ) -> Result<Vec<RelatedContent>, PipelineError> {
        if self.related_limit == 0 {
            return Ok(Vec::new());
        }
        let (tokens, _) = query_terms(keyword_text, related_terms);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let mut terms = tokens.into_iter().collect::<Vec<_>>();
        terms.sort();

        let pool = self.contents.find_related(&terms, RELATED_CANDIDATE_POOL).await?;
        let pool = pool
            .into_iter()
            .filter(|c| Some(c.id) != exclude)
            .collect::<Vec<_>>();
        let related = rank_related(keyword_text, related_terms, pool, self.related_limit);
        debug!(keyword = %keyword_text, found = related.len(), "Related content discovered");
        Ok(related)
    }

    /// 将草稿组装为待持久化的规范内容（未发布）
    pub fn assemble(
        &self,
        draft: GeneratedContentDraft,
        slug: String,
        related: &[RelatedContent],
    ) -> Content {
        let now = Utc::now().into();
        let body = insert_internal_links(&draft.body, related);
        let seo_meta = SeoMeta {
            headings: draft.headings.clone(),
            keywords: draft.keywords.clone(),
            slug: slug.clone(),
            thumbnail_hint: draft.thumbnail_hint.clone(),
        };

        Content {
            id: Uuid::new_v4(),
            slug,
            title: draft.title,
            excerpt: draft.excerpt,
            body,
            headings: draft.headings,
            keywords: draft.keywords,
            thumbnail_url: None,
            seo_meta,
            is_published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn base_slug(draft: &GeneratedContentDraft, keyword_text: &str) -> Option<String> {
    draft
        .slug_suggestion
        .as_deref()
        .and_then(slugify)
        .or_else(|| slugify(keyword_text))
        .or_else(|| slugify(&draft.title))
}

/// 高精度时间戳后缀（纳秒，base36）
pub fn unique_suffix() -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
    to_base36(nanos.unsigned_abs())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn query_terms(keyword_text: &str, related_terms: &[String]) -> (HashSet<String>, HashSet<String>) {
    let mut tokens = HashSet::new();
    let mut phrases = HashSet::new();
    for phrase in std::iter::once(keyword_text).chain(related_terms.iter().map(String::as_str)) {
        let normalized = phrase.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        tokens.extend(
            tokenize(&normalized)
                .into_iter()
                .filter(|t| !STOP_WORDS.contains(&t.as_str())),
        );
        phrases.insert(normalized);
    }
    (tokens, phrases)
}

/// 按匹配度打分
///
/// 词元重叠每个计 1 分，关键词整词命中额外计 2 分，标题命中计 1 分。
fn match_score(candidate: &RelatedContent, tokens: &HashSet<String>, phrases: &HashSet<String>) -> usize {
    let mut candidate_tokens = HashSet::new();
    for text in std::iter::once(&candidate.title)
        .chain(candidate.headings.iter())
        .chain(candidate.keywords.iter())
    {
        candidate_tokens.extend(tokenize(text));
    }

    let overlap = tokens.intersection(&candidate_tokens).count();
    if overlap == 0 {
        return 0;
    }

    let keyword_hits = candidate
        .keywords
        .iter()
        .filter(|k| phrases.contains(&k.trim().to_lowercase()))
        .count();
    let title = candidate.title.to_lowercase();
    let title_hits = phrases.iter().filter(|p| title.contains(p.as_str())).count();

    overlap + keyword_hits * 2 + title_hits
}

/// 对候选内容排序并截断
pub fn rank_related(
    keyword_text: &str,
    related_terms: &[String],
    candidates: Vec<RelatedContent>,
    limit: usize,
) -> Vec<RelatedContent> {
    let (tokens, phrases) = query_terms(keyword_text, related_terms);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored = candidates
        .into_iter()
        .map(|c| (match_score(&c, &tokens, &phrases), c))
        .filter(|(score, _)| *score > 0)
        .collect::<Vec<_>>();

    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| b.published_at.cmp(&a.published_at)));
    scored.into_iter().take(limit).map(|(_, c)| c).collect()
}

/// 在正文末尾追加“延伸阅读”区块
///
/// 没有相关内容时原样返回正文。
pub fn insert_internal_links(body: &str, related: &[RelatedContent]) -> String {
    if related.is_empty() {
        return body.to_string();
    }

    let items = related
        .iter()
        .map(|r| {
            format!(
                "<li><a href=\"/blog/{}\">{}</a></li>",
                html_escape::encode_double_quoted_attribute(&r.slug),
                html_escape::encode_text(&r.title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n<section class=\"related-reading\">\n<h2>Related Reading</h2>\n<ul>\n{}\n</ul>\n</section>",
        body.trim_end(),
        items
    )
}
