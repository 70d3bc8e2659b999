//! Classified result of a single completion call.

use std::fmt;

/// What happened during one call to the completion endpoint.
///
/// Produced by a `CompletionClient` per call and consumed immediately by the
/// dispatcher. Failures are values here, not errors, so the dispatcher can
/// switch on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// HTTP 200 with a non-empty generated message
    Success(String),
    /// HTTP 429
    RateLimited,
    /// HTTP 413
    PayloadTooLarge,
    /// Any other non-200 status, or a 200 without generated content
    UpstreamError(String),
    /// Connection failure, timeout or unreadable response body
    TransportError(String),
}

impl AttemptOutcome {
    /// Short machine-friendly name used as a log field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::RateLimited => "rate_limited",
            Self::PayloadTooLarge => "payload_too_large",
            Self::UpstreamError(_) => "upstream_error",
            Self::TransportError(_) => "transport_error",
        }
    }

    /// Returns true for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(_) => write!(f, "success"),
            Self::RateLimited => write!(f, "rate limited (HTTP 429)"),
            Self::PayloadTooLarge => write!(f, "payload too large (HTTP 413)"),
            Self::UpstreamError(message) | Self::TransportError(message) => {
                write!(f, "{message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct() {
        let labels = [
            AttemptOutcome::Success("ok".to_string()).label(),
            AttemptOutcome::RateLimited.label(),
            AttemptOutcome::PayloadTooLarge.label(),
            AttemptOutcome::UpstreamError("x".to_string()).label(),
            AttemptOutcome::TransportError("x".to_string()).label(),
        ];
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn display_carries_upstream_message() {
        let outcome = AttemptOutcome::UpstreamError("model decommissioned".to_string());
        assert_eq!(outcome.to_string(), "model decommissioned");

        let outcome = AttemptOutcome::TransportError("connection refused".to_string());
        assert_eq!(outcome.to_string(), "connection refused");
    }

    #[test]
    fn display_names_status_for_recoverable_outcomes() {
        assert!(AttemptOutcome::RateLimited.to_string().contains("429"));
        assert!(AttemptOutcome::PayloadTooLarge.to_string().contains("413"));
    }

    #[test]
    fn only_success_is_success() {
        assert!(AttemptOutcome::Success("hi".to_string()).is_success());
        assert!(!AttemptOutcome::RateLimited.is_success());
        assert!(!AttemptOutcome::UpstreamError("x".to_string()).is_success());
    }
}
