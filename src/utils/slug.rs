// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use deunicode::deunicode;

/// slug 的最大长度
pub const MAX_SLUG_LEN: usize = 80;

/// 生成 URL 安全的 slug
///
/// 先音译为 ASCII，再小写化，非字母数字字符折叠为单个连字符。
/// 结果为空时返回 `None`。
pub fn slugify(input: &str) -> Option<String> {
    let ascii = deunicode(input).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// 在 slug 后追加区分后缀
pub fn with_suffix(slug: &str, suffix: &str) -> String {
    format!("{}-{}", slug, suffix)
}
