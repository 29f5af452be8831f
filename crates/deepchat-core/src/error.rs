use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeepChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single completion round-trip, split by whether sending the
/// same request again could succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Timeouts, dropped connections, rate limiting and server-side errors.
    #[error("temporary failure: {reason}")]
    Retryable { status: Option<u16>, reason: String },

    /// Rejected credentials, malformed requests, unusable responses.
    #[error("request failed: {reason}")]
    Terminal { status: Option<u16>, reason: String },
}

impl CompletionError {
    pub fn retryable(reason: impl Into<String>) -> Self {
        Self::Retryable {
            status: None,
            reason: reason.into(),
        }
    }

    pub fn terminal(reason: impl Into<String>) -> Self {
        Self::Terminal {
            status: None,
            reason: reason.into(),
        }
    }

    /// Classify a non-2xx HTTP status. 408, 429 and 5xx are worth retrying;
    /// every other status means the request itself is wrong.
    pub fn from_status(status: u16, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if status == 408 || status == 429 || (500..600).contains(&status) {
            Self::Retryable {
                status: Some(status),
                reason,
            }
        } else {
            Self::Terminal {
                status: Some(status),
                reason,
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Retryable { status, .. } | Self::Terminal { status, .. } => *status,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Retryable { reason, .. } | Self::Terminal { reason, .. } => reason,
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            Self::retryable(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_status(status.as_u16(), e.to_string())
        } else if e.is_decode() {
            Self::terminal(format!("Failed to parse response: {e}"))
        } else {
            Self::retryable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(CompletionError::from_status(429, "rate limited").is_retryable());
        assert!(CompletionError::from_status(408, "timeout").is_retryable());
        assert!(CompletionError::from_status(500, "boom").is_retryable());
        assert!(CompletionError::from_status(503, "unavailable").is_retryable());

        assert!(!CompletionError::from_status(400, "bad request").is_retryable());
        assert!(!CompletionError::from_status(401, "bad key").is_retryable());
        assert!(!CompletionError::from_status(402, "no credits").is_retryable());
        assert!(!CompletionError::from_status(404, "no model").is_retryable());
    }

    #[test]
    fn test_status_and_reason_accessors() {
        let err = CompletionError::from_status(401, "No auth credentials found");
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.reason(), "No auth credentials found");

        let err = CompletionError::retryable("connection reset");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "temporary failure: connection reset");
    }
}
