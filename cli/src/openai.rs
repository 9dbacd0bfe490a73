use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use cookbook_core::error::GenerateError;
use cookbook_core::generate::{CompletionProvider, CompletionRequest};

use crate::config::GenerationSettings;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Chat-completions client for `OpenAI` and compatible endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    rt: tokio::runtime::Handle,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(settings: &GenerationSettings, rt: tokio::runtime::Handle) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("cookbook/{}", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            rt,
            endpoint: format!("{}/chat/completions", settings.base_url),
            api_key: settings.api_key.clone(),
        })
    }

    pub async fn complete_async(&self, request: &CompletionRequest) -> Result<String, GenerateError> {
        debug!(endpoint = %self.endpoint, model = %request.model, "sending chat completion");
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| {
                    let body = body.trim();
                    if body.is_empty() {
                        status.canonical_reason().unwrap_or("unknown error").to_string()
                    } else {
                        body.to_string()
                    }
                });
            return Err(GenerateError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let data: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| GenerateError::Decode(e.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerateError::EmptyResponse)
    }
}

impl CompletionProvider for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, GenerateError> {
        self.rt.block_on(self.complete_async(request))
    }
}
