//! Model dispatch with retry and prompt degradation.
//!
//! This module provides the `ModelDispatcher`, which walks an ordered list of
//! candidate models, retries rate-limited calls with backoff, falls back to the
//! reduced prompt once per model on payload-too-large, and returns exactly one
//! `DispatchResult` per query.

mod model_dispatcher;
mod state;
mod types;

pub use model_dispatcher::{ModelDispatcher, Sleeper};
pub use state::{AttemptState, Transition};
pub use types::{DispatchPolicy, DispatchResult, ModelCandidate, PromptVariant};
