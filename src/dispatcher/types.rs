//! Types shared by the dispatcher and its callers.

use std::fmt;
use std::time::Duration;

/// A remote model identifier and its position in the configured order.
///
/// Lower priority values are tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    id: String,
    priority: usize,
}

impl ModelCandidate {
    /// Creates a candidate at the given position.
    pub fn new(id: impl Into<String>, priority: usize) -> Self {
        Self {
            id: id.into(),
            priority,
        }
    }

    /// Builds candidates from identifiers listed in priority order.
    pub fn ordered<I, S>(ids: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(priority, id)| Self::new(id, priority))
            .collect()
    }

    /// Returns the model identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the zero-based position in the configured order.
    pub fn priority(&self) -> usize {
        self.priority
    }
}

/// Which system prompt is sent on an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// Instructions plus the dataset summary
    Full,
    /// Instructions only
    Reduced,
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Reduced => write!(f, "reduced"),
        }
    }
}

/// Retry limits and backoff timing for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Rate-limit retries allowed per model, on top of the first attempt
    pub max_rate_limit_retries: u32,
    /// Delay before the first retry; doubles for every further retry
    pub backoff_base: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: 2,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl DispatchPolicy {
    /// Delay before the retry that follows `retries` earlier retries.
    ///
    /// With the default policy this is 1s, then 2s.
    pub fn backoff_delay(&self, retries: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(retries))
    }
}

/// Final result of dispatching one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// A model produced a completion
    Success {
        text: String,
        model: String,
        variant: PromptVariant,
    },
    /// Every candidate failed; `last_error` names the last model and its error
    Exhausted { last_error: String },
    /// The caller went away before any model answered
    Cancelled,
}

impl DispatchResult {
    /// Returns true for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the generated text on success.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text, .. } => Some(text),
            Self::Exhausted { .. } | Self::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_assigns_priority_by_position() {
        let models = ModelCandidate::ordered(["llama-3.3-70b-versatile", "llama-3.1-8b-instant"]);

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id(), "llama-3.3-70b-versatile");
        assert_eq!(models[0].priority(), 0);
        assert_eq!(models[1].id(), "llama-3.1-8b-instant");
        assert_eq!(models[1].priority(), 1);
    }

    #[test]
    fn default_backoff_is_one_then_two_seconds() {
        let policy = DispatchPolicy::default();

        assert_eq!(policy.max_rate_limit_retries, 2);
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
    }

    #[test]
    fn backoff_is_strictly_increasing() {
        let policy = DispatchPolicy {
            max_rate_limit_retries: 5,
            backoff_base: Duration::from_millis(10),
        };

        let delays: Vec<Duration> = (0..5).map(|k| policy.backoff_delay(k)).collect();
        assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn prompt_variant_display() {
        assert_eq!(PromptVariant::Full.to_string(), "full");
        assert_eq!(PromptVariant::Reduced.to_string(), "reduced");
    }

    #[test]
    fn dispatch_result_accessors() {
        let success = DispatchResult::Success {
            text: "Oi".to_string(),
            model: "m1".to_string(),
            variant: PromptVariant::Full,
        };
        assert!(success.is_success());
        assert_eq!(success.text(), Some("Oi"));

        let exhausted = DispatchResult::Exhausted {
            last_error: "m1: Status 500".to_string(),
        };
        assert!(!exhausted.is_success());
        assert_eq!(exhausted.text(), None);

        assert!(!DispatchResult::Cancelled.is_success());
        assert_eq!(DispatchResult::Cancelled.text(), None);
    }
}
