/// Chat-completion HTTP client module.
///
/// This module provides a blocking client for an OpenAI-compatible chat-completion
/// endpoint. Each call performs exactly one request and reports a classified
/// `AttemptOutcome`; retry and fallback decisions belong to the dispatcher.
mod client;
mod outcome;

pub use client::{
    ChatCompletionClient, ChatCompletionClientBuilder, CompletionClient, CompletionError,
    DEFAULT_API_URL, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, classify_response,
};
pub use outcome::AttemptOutcome;
