// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 按字符数截断文本，超长时以省略号结尾
///
/// 结果（含省略号）不超过 `max_chars` 个字符，并尽量在单词边界处截断。
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }

    let keep: String = text.chars().take(max_chars - 3).collect();
    let cut = match keep.rfind(char::is_whitespace) {
        // keep at least half of the visible text
        Some(idx) if idx > keep.len() / 2 => &keep[..idx],
        _ => keep.as_str(),
    };
    format!("{}...", cut.trim_end())
}

/// 按空白和常见标点切分为小写词元
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// 短语中的单词数
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
