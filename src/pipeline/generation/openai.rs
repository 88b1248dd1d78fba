use serde::{Deserialize, Serialize};

use super::types::{GenerationRequest, TextGenerator};
use super::{truncate_chars, BackendFailure, FailureKind, GenerationError, MAX_FAILURE_DETAIL};
use crate::config::BackendConfig;
use crate::models::enums::ProviderKind;

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiClient {
    pub fn new(config: &BackendConfig, timeout_secs: u64) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
            timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request body for /v1/chat/completions
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Error envelope returned on non-2xx responses.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

/// Classify a non-success response using the status and the structured
/// `error.type` / `error.code` fields.
fn classify_failure(status: u16, body: &str) -> FailureKind {
    let detail = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let quota_code = detail.as_ref().is_some_and(|d| {
        d.code.as_deref() == Some("insufficient_quota")
            || d.kind.as_deref() == Some("insufficient_quota")
    });

    match status {
        429 if quota_code => FailureKind::QuotaExceeded,
        429 => FailureKind::RateLimited,
        402 => FailureKind::QuotaExceeded,
        _ => FailureKind::Other,
    }
}

impl TextGenerator for OpenAiClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendFailure> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    BackendFailure::other(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    BackendFailure::other(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendFailure::new(
                classify_failure(status.as_u16(), &body),
                format!(
                    "status {}: {}",
                    status.as_u16(),
                    truncate_chars(&body, MAX_FAILURE_DETAIL)
                ),
            ));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| BackendFailure::other(format!("Malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BackendFailure::other("Response contained no completion"))
    }
}
