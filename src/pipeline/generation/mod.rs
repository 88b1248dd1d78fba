pub mod gateway;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod types;

pub use gateway::*;
pub use gemini::*;
pub use mock::*;
pub use openai::*;
pub use types::*;

use thiserror::Error;

use crate::models::enums::ProviderKind;

/// Longest backend error detail kept in an attempt record (characters).
pub const MAX_FAILURE_DETAIL: usize = 300;

/// Closed classification of a backend failure.
///
/// Produced by the backend adapters from HTTP status and structured error
/// codes. Callers branch on this, never on error message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    QuotaExceeded,
    Other,
}

impl FailureKind {
    /// Whether switching backend or deferring can help.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::QuotaExceeded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Other => "other",
        }
    }
}

/// A single backend's classified failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} failure: {message}", kind.as_str())]
pub struct BackendFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Other, message)
    }
}

/// One failed backend attempt, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub provider: ProviderKind,
    pub kind: FailureKind,
    /// Backend error detail, truncated to `MAX_FAILURE_DETAIL` characters.
    pub detail: String,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No generation backend is configured")]
    Unavailable,

    #[error("All generation backends failed ({} attempts)", attempts.len())]
    Exhausted { attempts: Vec<FailedAttempt> },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl GenerationError {
    /// True when every attempt failed on rate limit or quota.
    pub fn is_quota_or_rate_limited(&self) -> bool {
        match self {
            Self::Exhausted { attempts } => {
                !attempts.is_empty() && attempts.iter().all(|a| a.kind.is_recoverable())
            }
            _ => false,
        }
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds() {
        assert!(FailureKind::RateLimited.is_recoverable());
        assert!(FailureKind::QuotaExceeded.is_recoverable());
        assert!(!FailureKind::Other.is_recoverable());
    }

    #[test]
    fn exhausted_all_quota_is_classified() {
        let err = GenerationError::Exhausted {
            attempts: vec![
                FailedAttempt {
                    provider: ProviderKind::OpenAi,
                    kind: FailureKind::QuotaExceeded,
                    detail: String::new(),
                },
                FailedAttempt {
                    provider: ProviderKind::Gemini,
                    kind: FailureKind::RateLimited,
                    detail: String::new(),
                },
            ],
        };
        assert!(err.is_quota_or_rate_limited());
        assert!(err.to_string().contains("2 attempts"));
    }

    #[test]
    fn mixed_failures_are_not_quota() {
        let err = GenerationError::Exhausted {
            attempts: vec![FailedAttempt {
                provider: ProviderKind::OpenAi,
                kind: FailureKind::Other,
                detail: "boom".into(),
            }],
        };
        assert!(!err.is_quota_or_rate_limited());
        assert!(!GenerationError::Unavailable.is_quota_or_rate_limited());
    }

    #[test]
    fn truncate_respects_multibyte_chars() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn backend_failure_display_names_kind() {
        let failure = BackendFailure::new(FailureKind::RateLimited, "slow down");
        assert_eq!(failure.to_string(), "rate_limited failure: slow down");
    }
}
