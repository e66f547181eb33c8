// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// SEO 元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoMeta {
    pub headings: Vec<String>,
    pub keywords: Vec<String>,
    pub slug: String,
    pub thumbnail_hint: Option<String>,
}

/// 规范内容（源语言文章）
///
/// 每次成功生成创建一条，slug 在创建时确定且之后不再变化。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub headings: Vec<String>,
    pub keywords: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub seo_meta: SeoMeta,
    pub is_published: bool,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// 本地化内容（翻译副本）
///
/// 与规范内容同形，额外带有语言代码和规范内容ID；
/// 每个 (original_content_id, language_code) 组合至多一条。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedContent {
    pub id: Uuid,
    pub original_content_id: Uuid,
    pub language_code: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub headings: Vec<String>,
    pub keywords: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub seo_meta: SeoMeta,
    pub is_published: bool,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl LocalizedContent {
    /// 以规范内容为模板创建翻译副本
    pub fn from_canonical(
        canonical: &Content,
        language_code: &str,
        title: String,
        excerpt: String,
        body: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_content_id: canonical.id,
            language_code: language_code.to_string(),
            slug: canonical.slug.clone(),
            title,
            excerpt,
            body,
            headings: canonical.headings.clone(),
            keywords: canonical.keywords.clone(),
            thumbnail_url: canonical.thumbnail_url.clone(),
            seo_meta: canonical.seo_meta.clone(),
            is_published: canonical.is_published,
            published_at: canonical.published_at,
            created_at: Utc::now().into(),
        }
    }
}

/// 内链候选：已发布的相关内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedContent {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub headings: Vec<String>,
    pub keywords: Vec<String>,
    pub published_at: Option<DateTime<FixedOffset>>,
}

impl From<&Content> for RelatedContent {
    fn from(content: &Content) -> Self {
        Self {
            id: content.id,
            slug: content.slug.clone(),
            title: content.title.clone(),
            headings: content.headings.clone(),
            keywords: content.keywords.clone(),
            published_at: content.published_at,
        }
    }
}
