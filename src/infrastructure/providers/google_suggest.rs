// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::transport_error;
use crate::config::settings::SuggestionSettings;
use crate::domain::providers::{KeywordSuggester, ProviderError};
use async_trait::async_trait;
use std::time::Duration;
use serde_json::Value;

const PROVIDER: &str = "google_suggest";

/// 搜索联想客户端
///
/// 响应格式为 `[query, [suggestion, ...], ...]`
pub struct GoogleSuggestClient {
    client: reqwest::Client,
    timeout: Duration,
    api_base_url: String,
}

impl GoogleSuggestClient {
    pub fn new(settings: &SuggestionSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            timeout: settings.timeout(),
            api_base_url: settings.api_base_url.clone(),
        }
    }
}

#[async_trait]
impl KeywordSuggester for GoogleSuggestClient {
    async fn suggest(&self, seed_phrase: &str) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(&self.api_base_url)
            .query(&[("client", "firefox"), ("q", seed_phrase)])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                provider: PROVIDER,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: Value = response.json().await.map_err(|e| ProviderError::InvalidResponse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        let suggestions = body
            .get(1)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: "expected [query, [suggestions]]".to_string(),
            })?;

        Ok(suggestions
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
