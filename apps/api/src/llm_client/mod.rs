/// LLM Client. The single point of entry for all model calls in Reelscope.
///
/// No other module talks to the provider directly. Analysis, generation and
/// suggestions go through `ChatCompleter`, which `LlmClient` implements
/// against an OpenAI-compatible chat completions endpoint (OpenRouter or OpenAI).
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, LlmProvider};

pub mod prompts;
pub mod retry;

use retry::{with_backoff, RetryPolicy, RETRYABLE_STATUSES};

/// Low temperature keeps labels and packs close to deterministic.
const TEMPERATURE: f32 = 0.2;
const APP_TITLE: &str = "Reelscope";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty or invalid content")]
    EmptyContent,

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl LlmError {
    /// Transport failures, rate limits, gateway errors and empty completions
    /// are retried. Client errors and parse failures are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::EmptyContent => true,
            LlmError::Api { status, .. } => RETRYABLE_STATUSES.contains(status),
            LlmError::Parse(_) | LlmError::MalformedResponse(_) | LlmError::Config(_) => false,
        }
    }
}

/// The seam every pipeline calls through. `LlmClient` is the production
/// implementation; tests substitute a scripted completer.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Sends a system + user message pair and returns the raw text content,
    /// which the model was asked to format as a JSON object.
    async fn chat_json(&self, system: &str, user: &str) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Chat completions client with retry logic, shared by every service.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    model: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let headers = build_headers(config)?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.llm_base_url),
            model: config.llm_model.clone(),
            retry: RetryPolicy::default(),
        })
    }

    /// One request/response round trip, no retries.
    async fn send_once(&self, body: &ChatCompletionRequest<'_>) -> Result<String, LlmError> {
        let response = self.client.post(&self.endpoint).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            if RETRYABLE_STATUSES.contains(&status.as_u16()) {
                warn!("LLM API returned {}: {}", status, message);
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&text)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl ChatCompleter for LlmClient {
    async fn chat_json(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        with_backoff(&self.retry, |_| self.send_once(&body)).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn build_headers(config: &Config) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.llm_api_key))
            .map_err(|e| LlmError::Config(format!("invalid API key header value: {e}")))?,
    );

    if config.llm_provider == LlmProvider::OpenRouter {
        headers.insert(
            "HTTP-Referer",
            HeaderValue::from_str(&config.app_url)
                .map_err(|e| LlmError::Config(format!("invalid APP_URL header value: {e}")))?,
        );
        headers.insert("X-Title", HeaderValue::from_static(APP_TITLE));
    }

    Ok(headers)
}

/// Slices the outermost `{ ... }` out of model output that carries extra
/// prose or code fences. Returns the input unchanged when there is no
/// well-ordered brace pair.
pub fn extract_json_candidate(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end >= start => &text[start..=end],
        _ => text,
    }
}

/// Calls the model and deserializes the JSON candidate of its reply as `T`.
pub async fn call_json<T: DeserializeOwned>(
    llm: &dyn ChatCompleter,
    system: &str,
    user: &str,
) -> Result<T, LlmError> {
    let raw = llm.chat_json(system, user).await?;
    serde_json::from_str(extract_json_candidate(&raw)).map_err(LlmError::Parse)
}

/// Round-trips a trivial prompt to confirm the provider is reachable.
pub async fn check_health(llm: &dyn ChatCompleter) -> bool {
    match llm
        .chat_json(prompts::HEALTH_CHECK_SYSTEM, prompts::HEALTH_CHECK_PROMPT)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            warn!("LLM health check failed: {e}");
            false
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted completer for pipeline tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    pub struct ScriptedCompleter {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedCompleter {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn failing(status: u16) -> Self {
            Self::new(vec![Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            })])
        }

        pub fn last_user_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().map(|(_, u)| u.clone())
        }
    }

    #[async_trait]
    impl ChatCompleter for ScriptedCompleter {
        async fn chat_json(&self, system: &str, user: &str) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}
