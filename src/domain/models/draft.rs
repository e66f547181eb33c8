// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 生成草稿
///
/// 生成服务返回的结构化结果，仅存在于内存中，
/// 校验通过后才会被转换为 `Content`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedContentDraft {
    pub title: String,
    pub excerpt: String,
    #[serde(alias = "content", alias = "html")]
    pub body: String,
    #[serde(alias = "headers")]
    pub headings: Vec<String>,
    #[serde(alias = "tags")]
    pub keywords: Vec<String>,
    #[serde(alias = "slug", alias = "slugSuggestion")]
    pub slug_suggestion: Option<String>,
    #[serde(alias = "thumbnailHint", alias = "thumbnail")]
    pub thumbnail_hint: Option<String>,
}
