use thiserror::Error;

/// Failure reported by an upstream adapter.
///
/// Every outbound call ends in one of these three shapes so the endpoint boundary can
/// decide between retry, stale fallback, "no data yet" and a hard 502 with a single match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Network error, timeout or a non-2xx status other than 404. Always retried.
    #[error("upstream request to {url} failed: {reason}")]
    Transient {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("upstream resource not found: {url}")]
    NotFound { url: String },

    #[error("invalid upstream payload from {url}: {reason}")]
    InvalidPayload { url: String, reason: String },
}

impl UpstreamError {
    pub fn transient(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transient {
            url: url.into(),
            status: None,
            reason: reason.into(),
        }
    }

    pub fn invalid_payload(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Transient { url, .. } | Self::NotFound { url } | Self::InvalidPayload { url, .. } => url,
        }
    }

    /// HTTP status carried by the failure, when the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transient { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::InvalidPayload { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Network failures, timeouts and every non-2xx status except 404 get another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("League rules error: {0}")]
    Rules(#[from] toml::de::Error),

    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    // Network errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Game summary unavailable: {0}")]
    SummaryUnavailable(UpstreamError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Request errors
    #[error("Unsupported input ({code}): {message}")]
    UnsupportedInput { code: &'static str, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No scoreboard event matches {0}")]
    EventNotFound(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn unsupported(code: &'static str, message: impl Into<String>) -> Self {
        Self::UnsupportedInput {
            code,
            message: message.into(),
        }
    }

    pub fn unsupported_league(value: &str) -> Self {
        Self::unsupported("unsupported_league", format!("league '{value}' is not supported"))
    }

    pub fn missing(code: &'static str, param: &str) -> Self {
        Self::unsupported(code, format!("query parameter '{param}' is required"))
    }

    /// Short machine-readable code placed in the `error` field of a response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedInput { code, .. } => code,
            Self::NotFound(_) => "not_found",
            Self::EventNotFound(_) => "event_not_found",
            Self::SummaryUnavailable(_) => "summary_unavailable",
            Self::Upstream(_) | Self::UpstreamUnavailable(_) => "upstream_unavailable",
            _ => "internal_error",
        }
    }
}

/// Result type alias for GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(UpstreamError::transient("u", "timeout").is_retryable());
        let server = UpstreamError::Transient {
            url: "u".into(),
            status: Some(503),
            reason: "bad gateway".into(),
        };
        assert!(server.is_retryable());
        let throttled = UpstreamError::Transient {
            url: "u".into(),
            status: Some(429),
            reason: "slow down".into(),
        };
        assert!(throttled.is_retryable());
        let forbidden = UpstreamError::Transient {
            url: "u".into(),
            status: Some(403),
            reason: "forbidden".into(),
        };
        assert!(forbidden.is_retryable());
        assert!(!UpstreamError::invalid_payload("u", "not json").is_retryable());
        assert!(!UpstreamError::NotFound { url: "u".into() }.is_retryable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(GatewayError::unsupported_league("xfl").code(), "unsupported_league");
        assert_eq!(GatewayError::missing("missing_slug", "slug").code(), "missing_slug");
        assert_eq!(GatewayError::NotFound("x".into()).code(), "not_found");
        assert_eq!(GatewayError::EventNotFound("Bills at Jets".into()).code(), "event_not_found");
        assert_eq!(
            GatewayError::SummaryUnavailable(UpstreamError::transient("u", "timeout")).code(),
            "summary_unavailable"
        );
        assert_eq!(
            GatewayError::Upstream(UpstreamError::NotFound { url: "u".into() }).code(),
            "upstream_unavailable"
        );
        assert_eq!(GatewayError::Internal("boom".into()).code(), "internal_error");
    }
}
