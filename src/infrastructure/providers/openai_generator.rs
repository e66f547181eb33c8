// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::transport_error;
use crate::config::settings::LlmSettings;
use crate::domain::providers::{ContentGenerator, ProviderError};
use async_trait::async_trait;
use std::time::Duration;
use serde_json::{json, Value};
use tracing::debug;

const PROVIDER: &str = "openai";

/// 生成式内容服务 - OpenAI 兼容的 chat/completions 接口
///
/// # 配置
///
/// - `llm.api_key` - API密钥，未配置时调用直接失败
/// - `llm.model` - 使用的模型名称
/// - `llm.api_base_url` - API基础URL，兼容任意 OpenAI 格式的服务
pub struct OpenAiGenerator {
    client: reqwest::Client,
    timeout: Duration,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn new(settings: &LlmSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            timeout: settings.timeout(),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ProviderError::NotConfigured(PROVIDER))?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert SEO content writer. You output only valid JSON."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
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

        let body: Value = response.json().await.map_err(|e| ProviderError::InvalidResponse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        if let Some(usage) = body.get("usage") {
            debug!(
                prompt_tokens = usage["prompt_tokens"].as_u64().unwrap_or(0),
                completion_tokens = usage["completion_tokens"].as_u64().unwrap_or(0),
                "Generation token usage"
            );
        }

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: "missing choices[0].message.content".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
