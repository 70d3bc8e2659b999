//! Dispatch loop over the configured model candidates.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::completion::CompletionClient;
use crate::prompt::SystemPrompts;

use super::state::{AttemptState, Transition};
use super::types::{DispatchPolicy, DispatchResult, ModelCandidate, PromptVariant};

/// Blocks the current thread for a backoff delay.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Routes a query through the candidate models until one answers.
///
/// The dispatcher holds no per-request state: retry counters and the prompt
/// variant live on the stack of each `dispatch` call, so one instance can be
/// shared across concurrent requests.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use faq_chat::completion::ChatCompletionClientBuilder;
/// use faq_chat::dispatcher::{ModelCandidate, ModelDispatcher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ChatCompletionClientBuilder::new().api_key("gsk_...").build()?;
/// let dispatcher = ModelDispatcher::new(
///     Arc::new(client),
///     ModelCandidate::ordered(["llama-3.3-70b-versatile", "llama-3.1-8b-instant"]),
/// );
///
/// let result = dispatcher.dispatch("Quando é a próxima live?", "full prompt", "reduced prompt");
/// println!("{:?}", result.text());
/// # Ok(())
/// # }
/// ```
pub struct ModelDispatcher {
    client: Arc<dyn CompletionClient>,
    models: Vec<ModelCandidate>,
    policy: DispatchPolicy,
    sleeper: Sleeper,
}

impl ModelDispatcher {
    /// Creates a dispatcher with the default policy and a real sleeper.
    pub fn new(client: Arc<dyn CompletionClient>, models: Vec<ModelCandidate>) -> Self {
        Self {
            client,
            models,
            policy: DispatchPolicy::default(),
            sleeper: Arc::new(thread::sleep),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the function used to wait between rate-limit retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the candidates in the order they are tried.
    pub fn models(&self) -> &[ModelCandidate] {
        &self.models
    }

    /// Returns the retry policy.
    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Dispatches a query using a composed prompt pair.
    pub fn dispatch_prompts(&self, user_message: &str, prompts: &SystemPrompts) -> DispatchResult {
        self.dispatch(user_message, prompts.full(), prompts.reduced())
    }

    /// Like [`dispatch_prompts`](Self::dispatch_prompts), but stops once `cancel` fires.
    pub fn dispatch_prompts_until_cancelled(
        &self,
        user_message: &str,
        prompts: &SystemPrompts,
        cancel: &CancellationToken,
    ) -> DispatchResult {
        self.dispatch_until_cancelled(user_message, prompts.full(), prompts.reduced(), cancel)
    }

    /// Dispatches a query to the candidate models in order.
    ///
    /// Each model starts on the full prompt. A rate-limited call is retried on
    /// the same model after a growing delay, up to the policy's retry budget.
    /// A payload-too-large response switches that model to the reduced prompt
    /// for one final attempt. Any other failure moves on to the next model.
    /// The first success is returned immediately.
    ///
    /// # Arguments
    ///
    /// * `user_message` - The question; callers must reject blank input first
    /// * `full_prompt` - System prompt including the dataset summary
    /// * `reduced_prompt` - System prompt without the dataset summary
    ///
    /// # Returns
    ///
    /// `DispatchResult::Success` with the first completion, or
    /// `DispatchResult::Exhausted` naming the last model that failed and why.
    pub fn dispatch(
        &self,
        user_message: &str,
        full_prompt: &str,
        reduced_prompt: &str,
    ) -> DispatchResult {
        let never = CancellationToken::new();
        self.dispatch_until_cancelled(user_message, full_prompt, reduced_prompt, &never)
    }

    /// Dispatches like [`dispatch`](Self::dispatch), checking `cancel` before
    /// every outbound call.
    ///
    /// A backoff sleep already in progress runs to its end, after which the
    /// cancellation is observed and `DispatchResult::Cancelled` is returned
    /// without calling the client again.
    pub fn dispatch_until_cancelled(
        &self,
        user_message: &str,
        full_prompt: &str,
        reduced_prompt: &str,
        cancel: &CancellationToken,
    ) -> DispatchResult {
        let mut last_error = None;

        for candidate in &self.models {
            let model = candidate.id();
            let mut state = AttemptState::initial();

            loop {
                if cancel.is_cancelled() {
                    tracing::info!(model, "Request cancelled, abandoning dispatch");
                    return DispatchResult::Cancelled;
                }

                let variant = state.variant();
                let prompt = match variant {
                    PromptVariant::Full => full_prompt,
                    PromptVariant::Reduced => reduced_prompt,
                };

                let outcome = self.client.attempt(model, prompt, user_message);

                match state.next(outcome, &self.policy) {
                    Transition::Finish(text) => {
                        tracing::info!(model, %variant, "Completion succeeded");
                        return DispatchResult::Success {
                            text,
                            model: model.to_string(),
                            variant,
                        };
                    }
                    Transition::Retry { next, delay } => {
                        tracing::warn!(
                            model,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "Rate limited, waiting before retry"
                        );
                        (self.sleeper)(delay);
                        state = next;
                    }
                    Transition::Degrade => {
                        tracing::warn!(
                            model,
                            "Payload too large, retrying without dataset context"
                        );
                        state = AttemptState::Reduced;
                    }
                    Transition::Abandon(reason) => {
                        tracing::warn!(
                            model,
                            %variant,
                            error = %reason,
                            "Model failed, trying next candidate"
                        );
                        last_error = Some(format!("{model}: {reason}"));
                        break;
                    }
                }
            }
        }

        let last_error = last_error.unwrap_or_else(|| "no models configured".to_string());
        tracing::error!(error = %last_error, "No model produced a completion");
        DispatchResult::Exhausted { last_error }
    }
}
