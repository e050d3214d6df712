use super::Source;
use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Why a source could not deliver its data.
#[derive(Debug, Clone)]
pub enum SourceError {
    /// Transport or server failure. Retryable by the caller.
    Unavailable(Arc<ohno::AppError>),

    /// The requested identity or resource does not exist upstream.
    NotFound(String),

    /// The upstream quota is exhausted, with the reset time when known.
    RateLimited(Option<DateTime<Utc>>),

    /// The upstream answered with data that does not match the expected schema.
    MalformedResponse(Arc<ohno::AppError>),
}

impl SourceError {
    pub fn unavailable(error: impl Into<ohno::AppError>) -> Self {
        Self::Unavailable(Arc::new(error.into()))
    }

    pub fn malformed(error: impl Into<ohno::AppError>) -> Self {
        Self::MalformedResponse(Arc::new(error.into()))
    }

    /// Short machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::NotFound(_) => "not_found",
            Self::RateLimited(_) => "rate_limited",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Malformed responses are reported to callers the same way as unavailable sources.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::MalformedResponse(_))
    }

    /// Whether retrying right away may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.is_unavailable()
    }

    /// Message suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unavailable(_) | Self::MalformedResponse(_) => "temporarily unavailable, try again later".to_string(),
            Self::NotFound(what) => format!("{what} could not be found"),
            Self::RateLimited(Some(reset_at)) => format!("rate limit reached, available again at {}", reset_at.format("%H:%M UTC")),
            Self::RateLimited(None) => "rate limit reached, try again later".to_string(),
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "source unavailable: {e}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::RateLimited(Some(reset_at)) => write!(f, "rate limited until {}", reset_at.to_rfc3339()),
            Self::RateLimited(None) => write!(f, "rate limited"),
            Self::MalformedResponse(e) => write!(f, "malformed response: {e}"),
        }
    }
}

impl core::error::Error for SourceError {}

/// A source that failed during one aggregation call.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: Source,
    pub error: SourceError,
}

impl Display for SourceFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

impl Serialize for SourceFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SourceFailure", 3)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("kind", self.error.kind())?;
        state.serialize_field("message", &self.error.user_message())?;
        state.end()
    }
}

/// Failure of a whole aggregation call.
#[derive(Debug, Clone)]
pub enum AggregateError {
    /// Every source that was queried failed.
    AllSourcesUnavailable(Vec<SourceFailure>),
}

impl AggregateError {
    #[must_use]
    pub fn causes(&self) -> &[SourceFailure] {
        match self {
            Self::AllSourcesUnavailable(causes) => causes,
        }
    }
}

impl Display for AggregateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AllSourcesUnavailable(causes) => {
                write!(f, "no data available, all {} source(s) failed", causes.len())?;
                for cause in causes {
                    write!(f, "; {cause}")?;
                }
                Ok(())
            }
        }
    }
}

impl core::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use ohno::app_err;

    #[test]
    fn test_kind_names() {
        assert_eq!(SourceError::unavailable(app_err!("boom")).kind(), "unavailable");
        assert_eq!(SourceError::NotFound("user 'x'".into()).kind(), "not_found");
        assert_eq!(SourceError::RateLimited(None).kind(), "rate_limited");
        assert_eq!(SourceError::malformed(app_err!("bad json")).kind(), "malformed_response");
    }

    #[test]
    fn test_malformed_counts_as_unavailable() {
        assert!(SourceError::malformed(app_err!("bad json")).is_unavailable());
        assert!(SourceError::malformed(app_err!("bad json")).is_retryable());
        assert!(!SourceError::NotFound("x".into()).is_retryable());
        assert!(!SourceError::RateLimited(None).is_retryable());
    }

    #[test]
    fn test_display() {
        let reset = DateTime::from_timestamp(1_704_067_200, 0).unwrap();
        assert_eq!(SourceError::RateLimited(Some(reset)).to_string(), "rate limited until 2024-01-01T00:00:00+00:00");
        assert_eq!(SourceError::NotFound("GitHub user 'ghost'".into()).to_string(), "GitHub user 'ghost' not found");
        assert!(SourceError::unavailable(app_err!("connection reset")).to_string().contains("connection reset"));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let message = SourceError::unavailable(app_err!("tcp connect error 10.0.0.1")).user_message();
        assert!(!message.contains("10.0.0.1"));

        let reset = DateTime::from_timestamp(1_704_067_200, 0).unwrap();
        assert!(SourceError::RateLimited(Some(reset)).user_message().contains("00:00 UTC"));
    }

    #[test]
    fn test_failure_serializes_kind_and_message() {
        let failure = SourceFailure {
            source: Source::Devto,
            error: SourceError::NotFound("dev.to user 'ghost'".into()),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["source"], "devto");
        assert_eq!(json["kind"], "not_found");
        assert_eq!(json["message"], "dev.to user 'ghost' could not be found");
    }

    #[test]
    fn test_aggregate_error_lists_causes() {
        let error = AggregateError::AllSourcesUnavailable(vec![
            SourceFailure { source: Source::Github, error: SourceError::RateLimited(None) },
            SourceFailure { source: Source::Devto, error: SourceError::NotFound("dev.to user 'x'".into()) },
        ]);
        let text = error.to_string();
        assert!(text.starts_with("no data available, all 2 source(s) failed"));
        assert!(text.contains("github: rate limited"));
        assert!(text.contains("devto: dev.to user 'x' not found"));
        assert_eq!(error.causes().len(), 2);
    }
}
