use serde::{Deserialize, Serialize};

use super::types::{GenerationRequest, TextGenerator};
use super::{truncate_chars, BackendFailure, FailureKind, GenerationError, MAX_FAILURE_DETAIL};
use crate::config::BackendConfig;
use crate::models::enums::ProviderKind;

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &BackendConfig, timeout_secs: u64) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.trim_start_matches("models/").to_string(),
            client,
            timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Request body for models/{model}:generateContent
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    status: Option<String>,
}

/// Classify a non-success response from the status and `error.status` field.
fn classify_failure(status: u16, body: &str) -> FailureKind {
    let api_status = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.status);

    match (status, api_status.as_deref()) {
        (429, Some("RESOURCE_EXHAUSTED")) => FailureKind::QuotaExceeded,
        (429, _) => FailureKind::RateLimited,
        _ => FailureKind::Other,
    }
}

impl TextGenerator for GeminiClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendFailure> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system,
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.params.temperature,
                max_output_tokens: request.params.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    BackendFailure::other(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    // Strip the URL: it carries the API key as a query parameter.
                    BackendFailure::other(e.without_url().to_string())
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

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| BackendFailure::other(format!("Malformed response: {}", e.without_url())))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(BackendFailure::other("Response contained no candidate text"));
        }
        Ok(text)
    }
}
