use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::aid::{GenerationParams, GenerativeAid};
use crate::config::LlmConfig;
use crate::error::{GatewayError, GatewayResult};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions client for any OpenAI-compatible endpoint, hosted or local.
pub struct OpenAiCompatibleAid {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleAid {
    pub fn from_config(config: &LlmConfig) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|error| GatewayError::GenerativeAid(error.to_string()))?;
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            client,
            endpoint: chat_endpoint(base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerativeAid for OpenAiCompatibleAid {
    fn id(&self) -> &str {
        "openai-compatible"
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> GatewayResult<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: params.max_output_tokens,
            temperature: params.temperature,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|error| GatewayError::GenerativeAid(error.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::GenerativeAid(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|error| GatewayError::GenerativeAid(error.to_string()))?;
        first_choice_content(&text)
    }
}

fn chat_endpoint(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{base}/chat/completions")
    }
}

fn first_choice_content(body: &str) -> GatewayResult<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|error| GatewayError::GenerativeAid(format!("invalid response: {error}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default().trim().to_string())
        .ok_or_else(|| GatewayError::GenerativeAid("response has no choices".to_string()))
}
