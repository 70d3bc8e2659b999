//! Per-model attempt state machine.
//!
//! The transition function is pure: it decides what the dispatcher does next
//! from the current state and the outcome of the last call, without sleeping
//! or calling anything itself.

use std::time::Duration;

use crate::completion::AttemptOutcome;

use super::types::{DispatchPolicy, PromptVariant};

/// Where a single model currently stands within one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Sending the full prompt; `retries` rate-limit retries already spent
    Full { retries: u32 },
    /// Sending the reduced prompt after a payload-too-large response
    Reduced,
}

/// What the dispatcher does after an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Return the completion to the caller
    Finish(String),
    /// Sleep for `delay`, then call the same model again in state `next`
    Retry { next: AttemptState, delay: Duration },
    /// Call the same model again with the reduced prompt
    Degrade,
    /// Give up on this model and move to the next candidate
    Abandon(String),
}

impl AttemptState {
    /// Every model starts at the full prompt with no retries spent.
    pub fn initial() -> Self {
        Self::Full { retries: 0 }
    }

    /// Returns the prompt variant sent in this state.
    pub fn variant(self) -> PromptVariant {
        match self {
            Self::Full { .. } => PromptVariant::Full,
            Self::Reduced => PromptVariant::Reduced,
        }
    }

    /// Decides the next step from the outcome of the call made in this state.
    pub fn next(self, outcome: AttemptOutcome, policy: &DispatchPolicy) -> Transition {
        match (self, outcome) {
            (_, AttemptOutcome::Success(text)) => Transition::Finish(text),
            (Self::Full { retries }, AttemptOutcome::RateLimited)
                if retries < policy.max_rate_limit_retries =>
            {
                Transition::Retry {
                    next: Self::Full {
                        retries: retries + 1,
                    },
                    delay: policy.backoff_delay(retries),
                }
            }
            (Self::Full { .. }, AttemptOutcome::PayloadTooLarge) => Transition::Degrade,
            // Reduced attempts get no second chance, whatever the failure
            (_, failure) => Transition::Abandon(failure.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DispatchPolicy {
        DispatchPolicy::default()
    }

    #[test]
    fn initial_state_sends_full_prompt() {
        assert_eq!(AttemptState::initial(), AttemptState::Full { retries: 0 });
        assert_eq!(AttemptState::initial().variant(), PromptVariant::Full);
        assert_eq!(AttemptState::Reduced.variant(), PromptVariant::Reduced);
    }

    #[test]
    fn success_finishes_in_either_state() {
        let ok = AttemptOutcome::Success("answer".to_string());

        assert_eq!(
            AttemptState::initial().next(ok.clone(), &policy()),
            Transition::Finish("answer".to_string())
        );
        assert_eq!(
            AttemptState::Reduced.next(ok, &policy()),
            Transition::Finish("answer".to_string())
        );
    }

    #[test]
    fn rate_limit_retries_with_increasing_delay_until_budget_spent() {
        let first = AttemptState::initial().next(AttemptOutcome::RateLimited, &policy());
        assert_eq!(
            first,
            Transition::Retry {
                next: AttemptState::Full { retries: 1 },
                delay: Duration::from_secs(1),
            }
        );

        let second =
            AttemptState::Full { retries: 1 }.next(AttemptOutcome::RateLimited, &policy());
        assert_eq!(
            second,
            Transition::Retry {
                next: AttemptState::Full { retries: 2 },
                delay: Duration::from_secs(2),
            }
        );

        let third = AttemptState::Full { retries: 2 }.next(AttemptOutcome::RateLimited, &policy());
        assert!(matches!(third, Transition::Abandon(ref reason) if reason.contains("429")));
    }

    #[test]
    fn payload_too_large_degrades_only_from_full() {
        assert_eq!(
            AttemptState::initial().next(AttemptOutcome::PayloadTooLarge, &policy()),
            Transition::Degrade
        );
        // After rate-limit retries too
        assert_eq!(
            AttemptState::Full { retries: 2 }.next(AttemptOutcome::PayloadTooLarge, &policy()),
            Transition::Degrade
        );
        assert!(matches!(
            AttemptState::Reduced.next(AttemptOutcome::PayloadTooLarge, &policy()),
            Transition::Abandon(_)
        ));
    }

    #[test]
    fn reduced_state_abandons_on_rate_limit() {
        assert!(matches!(
            AttemptState::Reduced.next(AttemptOutcome::RateLimited, &policy()),
            Transition::Abandon(_)
        ));
    }

    #[test]
    fn upstream_and_transport_errors_abandon_with_message() {
        assert_eq!(
            AttemptState::initial().next(
                AttemptOutcome::UpstreamError("Status 500".to_string()),
                &policy()
            ),
            Transition::Abandon("Status 500".to_string())
        );
        assert_eq!(
            AttemptState::initial().next(
                AttemptOutcome::TransportError("connection refused".to_string()),
                &policy()
            ),
            Transition::Abandon("connection refused".to_string())
        );
    }

    #[test]
    fn zero_retry_policy_abandons_first_rate_limit() {
        let policy = DispatchPolicy {
            max_rate_limit_retries: 0,
            backoff_base: Duration::from_secs(1),
        };

        assert!(matches!(
            AttemptState::initial().next(AttemptOutcome::RateLimited, &policy),
            Transition::Abandon(_)
        ));
    }
}
