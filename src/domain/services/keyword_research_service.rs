// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::keyword::{normalize_keyword_text, Keyword, KeywordPriority};
use crate::domain::providers::{KeywordSuggester, ProviderError};
use crate::domain::repositories::keyword_repository::{KeywordRepository, NewKeyword};
use crate::utils::errors::PipelineError;
use crate::utils::text_processing::word_count;
use metrics::counter;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 默认种子主题
pub const SEED_TOPICS: &[&str] = &[
    "korea sim card",
    "japan esim",
    "travel esim",
    "international roaming",
    "prepaid sim card",
    "esim vs physical sim",
    "unlimited data plan",
    "pocket wifi rental",
    "airport sim card",
    "usa esim",
];

/// 默认扩展修饰词
pub const EXPANSION_MODIFIERS: &[&str] = &[
    "guide",
    "cost",
    "requirements",
    "best",
    "how to buy",
    "for tourists",
    "review",
    "comparison",
];

const HIGH_VALUE_TERMS: &[&str] = &[
    "sim", "esim", "price", "cost", "best", "cheap", "unlimited", "data", "plan",
];

const INFORMATIONAL_TERMS: &[&str] = &["guide", "how", "what", "best", "vs", "review"];

const HIGH_TRAFFIC_TOPICS: &[&str] = &["korea sim card", "japan esim", "travel esim"];

const BASE_SCORE: u32 = 50;
const SHORT_PHRASE_BONUS: u32 = 25;
const MEDIUM_PHRASE_BONUS: u32 = 15;
const HIGH_VALUE_BONUS: u32 = 20;
const LONG_TAIL_WORDS: usize = 6;

const HIGH_THRESHOLD: u32 = 70;
const OUTSTANDING_THRESHOLD: u32 = 90;
const MEDIUM_THRESHOLD: u32 = 60;

/// 候选来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Suggestion,
    Expansion,
}

/// 关键词候选
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCandidate {
    pub text: String,
    pub score: u32,
    pub priority: KeywordPriority,
    pub source: CandidateSource,
    pub seed: String,
}

fn contains_term(words: &[&str], terms: &[&str]) -> bool {
    words.iter().any(|w| terms.contains(w))
}

/// 启发式评分
///
/// 基础分 50；三个词以内 +25，五个词以内 +15；包含高价值词 +20；超过六个词的长尾短语分数减半。
pub fn score_phrase(phrase: &str) -> u32 {
    let normalized = normalize_keyword_text(phrase);
    let words = normalized.split_whitespace().collect::<Vec<_>>();
    let count = words.len();

    let mut score = BASE_SCORE;
    if count <= 3 {
        score += SHORT_PHRASE_BONUS;
    } else if count <= 5 {
        score += MEDIUM_PHRASE_BONUS;
    }
    if contains_term(&words, HIGH_VALUE_TERMS) {
        score += HIGH_VALUE_BONUS;
    }
    if count > LONG_TAIL_WORDS {
        score /= 2;
    }
    score
}

/// 优先级分类
pub fn classify_priority(phrase: &str, score: u32) -> KeywordPriority {
    let normalized = normalize_keyword_text(phrase);
    let words = normalized.split_whitespace().collect::<Vec<_>>();
    let informational = contains_term(&words, INFORMATIONAL_TERMS);
    let high_traffic = HIGH_TRAFFIC_TOPICS
        .iter()
        .any(|topic| normalized.contains(topic));

    if (score >= HIGH_THRESHOLD && informational) || score >= OUTSTANDING_THRESHOLD || high_traffic {
        KeywordPriority::High
    } else if score >= MEDIUM_THRESHOLD {
        KeywordPriority::Medium
    } else {
        KeywordPriority::Low
    }
}

/// 关键词研究服务
///
/// 待处理关键词不足时发现并评分新的候选关键词。
pub struct KeywordResearchService {
    suggester: Arc<dyn KeywordSuggester>,
    keywords: Arc<dyn KeywordRepository>,
    seeds: Vec<String>,
    modifiers: Vec<String>,
    seed_limit: usize,
    modifiers_per_seed: usize,
    suggest_timeout: Duration,
}

impl KeywordResearchService {
    pub fn new(
        suggester: Arc<dyn KeywordSuggester>,
        keywords: Arc<dyn KeywordRepository>,
        seed_limit: usize,
        modifiers_per_seed: usize,
        suggest_timeout: Duration,
    ) -> Self {
        Self {
            suggester,
            keywords,
            seeds: SEED_TOPICS.iter().map(|s| s.to_string()).collect(),
            modifiers: EXPANSION_MODIFIERS.iter().map(|s| s.to_string()).collect(),
            seed_limit,
            modifiers_per_seed,
            suggest_timeout,
        }
    }

    /// 替换种子和修饰词
    pub fn with_seeds(mut self, seeds: Vec<String>, modifiers: Vec<String>) -> Self {
        self.seeds = seeds;
        self.modifiers = modifiers;
        self
    }

    async fn suggest(&self, seed: &str) -> Result<Vec<String>, ProviderError> {
        match tokio::time::timeout(self.suggest_timeout, self.suggester.suggest(seed)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout(
                self.suggester.name(),
                self.suggest_timeout,
            )),
        }
    }

    /// 收集原始候选：前 K 个种子的联想结果，以及每个种子与若干修饰词的组合
    async fn gather(&self) -> Vec<(String, CandidateSource, String)> {
        let mut raw = Vec::new();

        for seed in self.seeds.iter().take(self.seed_limit) {
            match self.suggest(seed).await {
                Ok(suggestions) => {
                    debug!(seed = %seed, count = suggestions.len(), "Received suggestions");
                    raw.extend(
                        suggestions
                            .into_iter()
                            .map(|s| (s, CandidateSource::Suggestion, seed.clone())),
                    );
                }
                Err(e) => warn!(seed = %seed, "Suggestion lookup failed, continuing: {}", e),
            }
        }

        for seed in &self.seeds {
            raw.push((seed.clone(), CandidateSource::Expansion, seed.clone()));
            for modifier in self.modifiers.iter().take(self.modifiers_per_seed) {
                raw.push((
                    format!("{} {}", seed, modifier),
                    CandidateSource::Expansion,
                    seed.clone(),
                ));
            }
        }

        raw
    }

    /// 发现候选关键词
    ///
    /// # 参数
    /// * `count` - 需要的候选数量
    ///
    /// # 返回值
    /// 去重、排除已存在关键词后，按优先级和分数降序排列的候选
    pub async fn discover(&self, count: usize) -> Result<Vec<KeywordCandidate>, PipelineError> {
        let raw = self.gather().await;

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for (text, source, seed) in raw {
            let normalized = normalize_keyword_text(&text);
            if normalized.is_empty() || !seen.insert(normalized.clone()) {
                continue;
            }
            let score = score_phrase(&normalized);
            candidates.push(KeywordCandidate {
                priority: classify_priority(&normalized, score),
                text: normalized,
                score,
                source,
                seed,
            });
        }

        let lookup = candidates.iter().map(|c| c.text.clone()).collect::<Vec<_>>();
        let existing = self.keywords.existing_normalized(&lookup).await?;
        candidates.retain(|c| !existing.contains(&c.text));

        candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then(b.score.cmp(&a.score)));
        candidates.truncate(count);

        info!(count = candidates.len(), excluded = existing.len(), "Keyword research finished");
        Ok(candidates)
    }

    /// 发现并写入新关键词
    ///
    /// 写入按规范化文本幂等，已存在的关键词会被静默跳过。
    pub async fn replenish(&self, count: usize) -> Result<Vec<Keyword>, PipelineError> {
        let candidates = self.discover(count).await?;
        let mut inserted = Vec::new();

        for candidate in candidates {
            let related_terms = vec![candidate.seed.clone()]
                .into_iter()
                .filter(|s| *s != candidate.text)
                .collect();
            let new_keyword = NewKeyword {
                text: candidate.text,
                priority: candidate.priority,
                related_terms,
                search_intent: Some(search_intent_for(candidate.source).to_string()),
                estimated_value: f64::from(candidate.score) / 100.0,
            };
            if let Some(keyword) = self.keywords.insert_if_absent(new_keyword).await? {
                inserted.push(keyword);
            }
        }

        counter!("keywords_researched_total").increment(inserted.len() as u64);
        info!(inserted = inserted.len(), "Keyword store replenished");
        Ok(inserted)
    }
}

fn search_intent_for(source: CandidateSource) -> &'static str {
    match source {
        CandidateSource::Suggestion => "search_suggestion",
        CandidateSource::Expansion => "informational",
    }
}

#[cfg(test)]
#[path = "keyword_research_service_test.rs"]
mod tests;
