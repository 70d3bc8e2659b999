/// Chat-completion HTTP client implementation.
///
/// This module provides `ChatCompletionClient` for making synchronous requests to an
/// OpenAI-compatible `/chat/completions` endpoint, along with the builder used to
/// configure it and the `CompletionClient` trait the dispatcher depends on.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AttemptOutcome;

/// Groq's OpenAI-compatible chat-completion endpoint.
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Per-call timeout covering connect, send and body read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling temperature sent with every request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Upper bound on generated tokens sent with every request.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Errors that can occur while constructing a `ChatCompletionClient`.
///
/// Per-call failures are never reported here; they are classified into
/// `AttemptOutcome` instead.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The underlying HTTP client could not be created
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Invalid endpoint URL configuration
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No bearer credential was provided
    #[error("API key is missing or blank")]
    MissingApiKey,
}

/// Builder for constructing `ChatCompletionClient` instances.
///
/// # Examples
///
/// ```
/// use faq_chat::completion::ChatCompletionClientBuilder;
///
/// let client = ChatCompletionClientBuilder::new()
///     .api_key("gsk_test")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.api_url(), faq_chat::completion::DEFAULT_API_URL);
/// ```
#[derive(Debug, Default)]
pub struct ChatCompletionClientBuilder {
    api_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl ChatCompletionClientBuilder {
    /// Creates a new `ChatCompletionClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full URL of the chat-completion endpoint.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets the bearer token sent in the `Authorization` header.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum number of generated tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Builds the `ChatCompletionClient` with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::MissingApiKey` if no non-blank key was set,
    /// `CompletionError::InvalidUrl` if the endpoint URL does not parse, and
    /// `CompletionError::Network` if the HTTP client cannot be created.
    pub fn build(self) -> Result<ChatCompletionClient, CompletionError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CompletionError::MissingApiKey)?;

        let api_url = self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());

        // Validate URL
        reqwest::Url::parse(&api_url)
            .map_err(|e| CompletionError::InvalidUrl(format!("{}: {}", api_url, e)))?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(CompletionError::Network)?;

        Ok(ChatCompletionClient {
            client,
            api_url,
            api_key,
            timeout,
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

/// Synchronous client for an OpenAI-compatible chat-completion endpoint.
///
/// It should be constructed using `ChatCompletionClientBuilder`.
pub struct ChatCompletionClient {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

/// Trait for a single classified completion call.
///
/// This trait is the seam the dispatcher depends on, which lets tests drive it
/// with scripted outcomes instead of real network calls.
pub trait CompletionClient: Send + Sync {
    /// Performs exactly one completion call.
    ///
    /// # Arguments
    ///
    /// * `model` - Identifier of the remote model
    /// * `system_prompt` - The system prompt variant to send
    /// * `user_message` - The user's question, already validated as non-blank
    fn attempt(&self, model: &str, system_prompt: &str, user_message: &str) -> AttemptOutcome;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ChatCompletionClient {
    /// Returns the endpoint URL configured for this client.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Returns the maximum number of generated tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn request_body<'a>(
        &self,
        model: &'a str,
        system_prompt: &'a str,
        user_message: &'a str,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    fn attempt_internal(
        &self,
        model: &str,
        system_prompt: &str,
        user_message: &str,
    ) -> AttemptOutcome {
        let body = self.request_body(model, system_prompt, user_message);

        let response = match self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                let outcome = AttemptOutcome::TransportError(describe_transport_error(&e));
                tracing::warn!(
                    model,
                    outcome = outcome.label(),
                    error = %outcome,
                    "Completion attempt failed"
                );
                return outcome;
            }
        };

        let status = response.status().as_u16();
        let outcome = match response.text() {
            Ok(text) => classify_response(status, &text),
            Err(e) => AttemptOutcome::TransportError(format!(
                "failed to read response body: {}",
                describe_transport_error(&e)
            )),
        };

        tracing::info!(model, status, outcome = outcome.label(), "Completion attempt");
        outcome
    }
}

impl CompletionClient for ChatCompletionClient {
    fn attempt(&self, model: &str, system_prompt: &str, user_message: &str) -> AttemptOutcome {
        self.attempt_internal(model, system_prompt, user_message)
    }
}

/// Classifies an HTTP status and response body into an `AttemptOutcome`.
///
/// - 200 with a non-empty `choices[0].message.content` is `Success`
/// - 200 without generated content is `UpstreamError("empty response")`
/// - 200 with a body that is not JSON is `TransportError`
/// - 429 is `RateLimited`, 413 is `PayloadTooLarge`
/// - anything else is `UpstreamError` carrying `error.message` from the JSON
///   envelope, or `Status <code>` when there is none
pub fn classify_response(status: u16, body: &str) -> AttemptOutcome {
    match status {
        200 => match serde_json::from_str::<ChatResponse>(body) {
            Ok(parsed) => parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message)
                .and_then(|message| message.content)
                .filter(|content| !content.is_empty())
                .map_or_else(
                    || AttemptOutcome::UpstreamError("empty response".to_string()),
                    AttemptOutcome::Success,
                ),
            Err(e) => AttemptOutcome::TransportError(format!("malformed response body: {e}")),
        },
        429 => AttemptOutcome::RateLimited,
        413 => AttemptOutcome::PayloadTooLarge,
        _ => AttemptOutcome::UpstreamError(
            extract_error_message(body).unwrap_or_else(|| format!("Status {status}")),
        ),
    }
}

/// Pulls `error.message` out of an error envelope, if present.
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()?
        .error?
        .message
        .filter(|message| !message.is_empty())
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    }
}
