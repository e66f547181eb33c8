// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 翻译目标语言
///
/// `provider_tag` 传给翻译服务，`storage_code` 写入数据库；
/// 区域变体在存储时会被规范化为更简单的代码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetLanguage {
    pub provider_tag: &'static str,
    pub storage_code: &'static str,
}

impl TargetLanguage {
    pub const fn new(provider_tag: &'static str, storage_code: &'static str) -> Self {
        Self {
            provider_tag,
            storage_code,
        }
    }
}

/// 固定的 11 种目标语言
pub const TARGET_LANGUAGES: [TargetLanguage; 11] = [
    TargetLanguage::new("ko", "ko"),
    TargetLanguage::new("ja", "ja"),
    TargetLanguage::new("zh-CN", "zh"),
    TargetLanguage::new("zh-TW", "zh-tw"),
    TargetLanguage::new("es", "es"),
    TargetLanguage::new("fr", "fr"),
    TargetLanguage::new("de", "de"),
    TargetLanguage::new("ru", "ru"),
    TargetLanguage::new("vi", "vi"),
    TargetLanguage::new("th", "th"),
    TargetLanguage::new("id", "id"),
];
