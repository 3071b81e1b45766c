use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::{AiProvider, ProviderRequest};
use super::AnalysisError;
use crate::config::GatewayConfig;

/// Header carrying the API key on every Gemini request.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest provider error body kept for the logs.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Gemini `generateContent` client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Build a client from the injected gateway configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

/// Request body for `models/{model}:generateContent`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
}

/// Response body from `generateContent`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a ProviderRequest) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, AnalysisError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        tracing::warn!(block_reason = %reason, "Prompt blocked by AI provider");
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(AnalysisError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = candidate.finish_reason {
            tracing::warn!(finish_reason = %reason, "AI provider returned an empty candidate");
        }
        return Err(AnalysisError::EmptyResponse);
    }

    Ok(text)
}

/// Map a non-success HTTP status to the diagnostic error kind.
fn status_error(status: u16, body: String) -> AnalysisError {
    match status {
        401 | 403 => AnalysisError::Auth { status },
        429 => AnalysisError::RateLimited,
        _ => AnalysisError::Provider {
            status,
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        },
    }
}

#[async_trait]
impl AiProvider for GeminiClient {
    async fn generate(&self, request: &ProviderRequest) -> Result<String, AnalysisError> {
        let url = self.endpoint(&request.model);
        let body = GenerateContentRequest::from_request(request);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Transport(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else if e.is_connect() {
                    AnalysisError::Transport(format!("Cannot reach AI provider at {}", self.base_url))
                } else {
                    AnalysisError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        extract_text(parsed)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Mock provider for testing: replays configured outcomes in order.
///
/// The last outcome repeats once the queue is down to one entry.
pub struct MockProvider {
    outcomes: Mutex<VecDeque<Result<String, AnalysisError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Always answer with `response`.
    pub fn new(response: &str) -> Self {
        Self::sequence(vec![Ok(response.to_string())])
    }

    /// Always fail with `error`.
    pub fn failing(error: AnalysisError) -> Self {
        Self::sequence(vec![Err(error)])
    }

    pub fn sequence(outcomes: Vec<Result<String, AnalysisError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep before answering, to keep a call in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn next_outcome(&self) -> Result<String, AnalysisError> {
        let mut outcomes = self
            .outcomes
            .lock()
            .map_err(|_| AnalysisError::Transport("mock lock poisoned".into()))?;
        let outcome = if outcomes.len() > 1 {
            outcomes.pop_front()
        } else {
            outcomes.front().cloned()
        };
        outcome.unwrap_or(Err(AnalysisError::EmptyResponse))
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<String, AnalysisError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_outcome()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
