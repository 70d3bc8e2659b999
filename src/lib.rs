//! Question answering over a fixed FAQ dataset.
//!
//! The dataset is summarized into a system prompt once at startup. Each
//! question is dispatched to an ordered list of remote chat-completion models,
//! with retry-with-backoff on rate limiting and a one-time fallback to a
//! prompt without the dataset when the upstream rejects the payload size.

pub mod completion;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod prompt;
pub mod server;

pub use completion::{
    AttemptOutcome, ChatCompletionClient, ChatCompletionClientBuilder, CompletionClient,
    CompletionError,
};
pub use config::{AppConfig, ConfigError};
pub use context::{ContextLimits, Dataset, DatasetError};
pub use dispatcher::{
    DispatchPolicy, DispatchResult, ModelCandidate, ModelDispatcher, PromptVariant,
};
pub use error::StartupError;
pub use prompt::SystemPrompts;
pub use server::{AppState, create_router};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_accessible_from_crate_root() {
        let prompts = SystemPrompts::compose("");
        assert!(!prompts.reduced().is_empty());

        let models = ModelCandidate::ordered(["a"]);
        assert_eq!(models[0].priority(), 0);

        assert_eq!(DispatchPolicy::default().max_rate_limit_retries, 2);
        assert_eq!(ContextLimits::default().max_rows, 50);
    }
}
