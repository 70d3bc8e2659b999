//! Shared application state.

use std::sync::Arc;

use crate::completion::ChatCompletionClientBuilder;
use crate::config::AppConfig;
use crate::context::{ContextLimits, Dataset};
use crate::dispatcher::{ModelCandidate, ModelDispatcher};
use crate::error::StartupError;
use crate::prompt::SystemPrompts;

/// Read-only state shared by every request handler.
///
/// Built once before the server starts; nothing in it is mutated afterwards.
pub struct AppState {
    pub dispatcher: ModelDispatcher,
    pub prompts: SystemPrompts,
    pub dataset_loaded: bool,
    pub provider: String,
}

impl AppState {
    /// Creates state from already-built parts.
    pub fn new(
        dispatcher: ModelDispatcher,
        prompts: SystemPrompts,
        dataset_loaded: bool,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            prompts,
            dataset_loaded,
            provider: provider.into(),
        }
    }

    /// Loads the dataset, composes the prompts and builds the dispatcher.
    ///
    /// Must run outside of an async context: it creates a blocking HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `StartupError::Dataset` if the dataset cannot be loaded and
    /// `StartupError::Client` if the completion client cannot be created.
    pub fn initialize(config: &AppConfig) -> Result<Self, StartupError> {
        let dataset = Dataset::load(&config.dataset_path)?;
        tracing::info!(
            path = %config.dataset_path.display(),
            rows = dataset.row_count(),
            columns = dataset.headers().len(),
            "Dataset loaded"
        );

        let summary = dataset.summarize(&ContextLimits::default());
        let prompts = SystemPrompts::compose(&summary);

        let client = ChatCompletionClientBuilder::new()
            .api_url(&config.api_url)
            .api_key(&config.api_key)
            .timeout(config.request_timeout)
            .build()?;

        let dispatcher = ModelDispatcher::new(
            Arc::new(client),
            ModelCandidate::ordered(config.models.iter().cloned()),
        );

        Ok(Self::new(
            dispatcher,
            prompts,
            !dataset.is_empty(),
            config.provider.clone(),
        ))
    }
}
