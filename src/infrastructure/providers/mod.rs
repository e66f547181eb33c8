// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 外部服务客户端
///
/// 领域层 `ContentGenerator`、`Translator`、`KeywordSuggester` 的 HTTP 实现
pub mod google_suggest;
pub mod google_translator;
pub mod openai_generator;

use crate::domain::providers::ProviderError;
use std::time::Duration;

/// reqwest 错误映射为服务错误，超时单独区分
pub(crate) fn transport_error(provider: &'static str, timeout: Duration, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(provider, timeout)
    } else {
        ProviderError::Transport {
            provider,
            message: err.to_string(),
        }
    }
}
