//! SDK error types and normalization
//!
//! Every failure the client can produce is an [`SdkError`]. Each error
//! projects onto a small closed taxonomy ([`ErrorKind`]) that callers can
//! branch on and show to users without inspecting transport details.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The main error type for the SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// No response arrived within the per-call budget
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection could not be established or no response was received
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// A response arrived but its body could not be read
    #[error("Malformed response body: {0}")]
    MalformedResponse(#[source] reqwest::Error),

    /// The API rejected the credentials (HTTP 401)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Endpoint or resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded. Retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// The server failed to handle the request (HTTP 5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success HTTP status
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    /// The backend reported that the topic job failed
    #[error("Processing failed for topic {topic_id}")]
    JobProcessingFailed { topic_id: String },

    /// The topic job did not reach a terminal status within the poll budget
    #[error("Topic {topic_id} still pending after {attempts} status checks")]
    JobTimedOut { topic_id: String, attempts: u32 },

    /// The health check failed, so no job was submitted
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(#[source] Box<SdkError>),

    /// The request was cancelled by the caller
    #[error("Request cancelled")]
    Cancelled,

    /// Input rejected before any network call was made
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

/// Result type alias for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

/// Closed set of failure kinds surfaced to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Client-side timeout
    Timeout,
    /// HTTP 401
    Authentication,
    /// HTTP 404
    NotFound,
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    ServerError,
    /// No network or no response object
    Network,
    /// Server-reported job failure
    JobProcessing,
    /// Poll budget exhausted
    JobTimeout,
    /// Everything else
    Unexpected,
}

impl ErrorKind {
    /// Fixed user-facing label for this kind
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timed out",
            ErrorKind::Authentication => "authentication failed",
            ErrorKind::NotFound => "endpoint/resource not found",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::ServerError => "server error",
            ErrorKind::Network => "network error",
            ErrorKind::JobProcessing => "processing failed",
            ErrorKind::JobTimeout => "job timed out",
            ErrorKind::Unexpected => "unexpected error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error body shapes returned by the API.
///
/// The backend is not consistent: some routes answer with
/// `{"error": ..., "message": ...}`, FastAPI-style routes with `{"detail": ...}`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    /// Best human-readable message in the body, if any
    pub fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| match &self.detail {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(other) if !other.is_null() => Some(other.to_string()),
                _ => None,
            })
            .or_else(|| self.error.clone())
            .filter(|m| !m.trim().is_empty())
    }
}

impl SdkError {
    /// Build an error from a non-success HTTP response.
    ///
    /// Classification is driven by the status code only; the body just
    /// supplies the message.
    pub fn from_response(status: u16, body: &str, retry_after: Option<u64>) -> Self {
        let parsed = serde_json::from_str::<ApiErrorResponse>(body).unwrap_or_default();
        let message = parsed.message();

        match status {
            401 => SdkError::AuthenticationError(
                message.unwrap_or_else(|| "Invalid or missing API key".to_string()),
            ),
            404 => SdkError::NotFound(message.unwrap_or_else(|| "Resource not found".to_string())),
            429 => SdkError::RateLimited { retry_after },
            500..=599 => SdkError::ServerError {
                status,
                message: message.unwrap_or_else(|| format!("Status: {}", status)),
            },
            _ => SdkError::ApiError {
                status,
                message: message.unwrap_or_else(|| body.trim().to_string()),
                error_code: parsed.error,
            },
        }
    }

    /// Map a transport failure from reqwest
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            SdkError::Timeout(timeout)
        } else if err.is_decode() {
            SdkError::MalformedResponse(err)
        } else {
            SdkError::NetworkError(err)
        }
    }

    /// Refusal to submit work because the health check failed with `cause`
    pub fn service_unavailable(cause: SdkError) -> Self {
        SdkError::ServiceUnavailable(Box::new(cause))
    }

    /// Project this error onto the user-facing taxonomy.
    ///
    /// A refused submission reports the kind of the failed health check.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::ServiceUnavailable(cause) => cause.kind(),
            SdkError::Timeout(_) => ErrorKind::Timeout,
            SdkError::NetworkError(_) => ErrorKind::Network,
            SdkError::AuthenticationError(_) => ErrorKind::Authentication,
            SdkError::NotFound(_) => ErrorKind::NotFound,
            SdkError::RateLimited { .. } => ErrorKind::RateLimited,
            SdkError::ServerError { .. } => ErrorKind::ServerError,
            SdkError::JobProcessingFailed { .. } => ErrorKind::JobProcessing,
            SdkError::JobTimedOut { .. } => ErrorKind::JobTimeout,
            SdkError::ApiError { .. }
            | SdkError::Cancelled
            | SdkError::MalformedResponse(_)
            | SdkError::ValidationError(_)
            | SdkError::ConfigurationError(_)
            | SdkError::SerializationError(_)
            | SdkError::UrlError(_) => ErrorKind::Unexpected,
        }
    }

    /// Message shown to the user.
    ///
    /// Classified failures use the fixed label of their kind. Unclassified
    /// ones surface the server-provided message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            SdkError::ServiceUnavailable(cause) => cause.user_message(),
            SdkError::ApiError { message, .. } if !message.is_empty() => message.clone(),
            SdkError::ValidationError(message) => message.clone(),
            SdkError::Cancelled => "request cancelled".to_string(),
            other => other.kind().label().to_string(),
        }
    }

    /// Check if the retry interceptor may re-issue the request
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SdkError::NetworkError(_)
                | SdkError::Timeout(_)
                | SdkError::RateLimited { .. }
                | SdkError::ServerError { .. }
        )
    }

    /// Whether the caller cancelled the request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SdkError::Cancelled)
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SdkError::ApiError { status, .. } | SdkError::ServerError { status, .. } => {
                Some(*status)
            }
            SdkError::RateLimited { .. } => Some(429),
            SdkError::AuthenticationError(_) => Some(401),
            SdkError::NotFound(_) => Some(404),
            SdkError::ServiceUnavailable(cause) => cause.status_code(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_map_to_kinds() {
        assert_eq!(SdkError::from_response(401, "", None).kind(), ErrorKind::Authentication);
        assert_eq!(SdkError::from_response(404, "", None).kind(), ErrorKind::NotFound);
        assert_eq!(SdkError::from_response(429, "", Some(3)).kind(), ErrorKind::RateLimited);
        assert_eq!(SdkError::from_response(500, "", None).kind(), ErrorKind::ServerError);
        assert_eq!(SdkError::from_response(503, "oops", None).kind(), ErrorKind::ServerError);
        assert_eq!(SdkError::from_response(400, "", None).kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_kind_is_driven_by_status_not_body() {
        // A 400 whose body talks about rate limits is still a plain API error.
        let body = r#"{"error": "rate_limit", "message": "rate_limit exceeded upstream"}"#;
        let error = SdkError::from_response(400, body, None);

        assert_eq!(error.kind(), ErrorKind::Unexpected);
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_server_message_surfaces_for_unclassified_errors() {
        let body = r#"{"error": "bad_topic", "message": "Topic is too long"}"#;
        let error = SdkError::from_response(422, body, None);
        assert_eq!(error.user_message(), "Topic is too long");

        let detail = r#"{"detail": "max_results must be positive"}"#;
        let error = SdkError::from_response(400, detail, None);
        assert_eq!(error.user_message(), "max_results must be positive");
    }

    #[test]
    fn test_unclassified_error_without_message_is_generic() {
        let error = SdkError::from_response(418, "", None);
        assert_eq!(error.user_message(), "unexpected error");
    }

    #[test]
    fn test_classified_errors_use_fixed_labels() {
        let body = r#"{"message": "token expired"}"#;
        assert_eq!(
            SdkError::from_response(401, body, None).user_message(),
            "authentication failed"
        );
        assert_eq!(
            SdkError::Timeout(Duration::from_secs(5)).user_message(),
            "timed out"
        );
        assert_eq!(
            SdkError::JobTimedOut {
                topic_id: "t".to_string(),
                attempts: 10
            }
            .user_message(),
            "job timed out"
        );
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(SdkError::RateLimited { retry_after: None }.is_retryable());
        assert!(SdkError::Timeout(Duration::from_secs(10)).is_retryable());
        assert!(SdkError::ServerError {
            status: 502,
            message: "bad gateway".to_string()
        }
        .is_retryable());

        assert!(!SdkError::Cancelled.is_retryable());
        assert!(!SdkError::NotFound("topic".to_string()).is_retryable());
        assert!(!SdkError::AuthenticationError("nope".to_string()).is_retryable());
    }

    #[test]
    fn test_error_status_code() {
        let api_error = SdkError::ApiError {
            status: 400,
            message: "Bad request".to_string(),
            error_code: None,
        };
        assert_eq!(api_error.status_code(), Some(400));
        assert_eq!(SdkError::NotFound(String::new()).status_code(), Some(404));
        assert_eq!(SdkError::Cancelled.status_code(), None);
    }

    #[test]
    fn test_timeout_keeps_sub_second_budget() {
        let error = SdkError::Timeout(Duration::from_millis(50));
        assert_eq!(error.to_string(), "Request timed out after 50ms");
    }

    #[test]
    fn test_refused_submission_keeps_health_check_kind() {
        let refused = SdkError::service_unavailable(SdkError::from_response(500, "", None));
        assert_eq!(refused.kind(), ErrorKind::ServerError);
        assert_eq!(refused.user_message(), "server error");
        assert_eq!(refused.status_code(), Some(500));
        assert!(!refused.is_retryable());

        let refused = SdkError::service_unavailable(SdkError::Timeout(Duration::from_secs(5)));
        assert_eq!(refused.kind(), ErrorKind::Timeout);
        assert_eq!(refused.user_message(), "timed out");
    }
}
