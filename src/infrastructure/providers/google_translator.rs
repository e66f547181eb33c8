// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::transport_error;
use crate::config::settings::TranslationSettings;
use crate::domain::providers::{ProviderError, Translator};
use async_trait::async_trait;
use std::time::Duration;
use serde::Deserialize;
use serde_json::json;

const PROVIDER: &str = "google_translate";

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Google Cloud Translation (v2) 客户端
pub struct GoogleTranslator {
    client: reqwest::Client,
    timeout: Duration,
    api_key: Option<String>,
    api_base_url: String,
    source_language: String,
}

impl GoogleTranslator {
    pub fn new(settings: &TranslationSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            timeout: settings.timeout(),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            api_base_url: settings.api_base_url.clone(),
            source_language: settings.source_language.clone(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language_tag: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ProviderError::NotConfigured(PROVIDER))?;

        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .query(&[("key", api_key.as_str())])
            .json(&json!({
                "q": text,
                "source": self.source_language,
                "target": target_language_tag,
                "format": "html"
            }))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse =
            response.json().await.map_err(|e| ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: "empty translations array".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
