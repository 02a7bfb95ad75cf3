//! UI-facing result shape
//!
//! [`ApiResult`] is what front-end code receives from every call: either a
//! payload or a user-readable error, never a propagated failure.

use crate::error::{ErrorKind, SdkError, SdkResult};
use serde::Serialize;

/// `{ data, error }` pair returned across the UI boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResult<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T> ApiResult<T> {
    /// Successful result carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    /// Failed result normalized from `error`
    pub fn failed(error: &SdkError) -> Self {
        Self {
            data: None,
            error: Some(error.user_message()),
            kind: Some(error.kind()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResult<U> {
        ApiResult {
            data: self.data.map(f),
            error: self.error,
            kind: self.kind,
        }
    }
}

impl<T> From<SdkResult<T>> for ApiResult<T> {
    fn from(result: SdkResult<T>) -> Self {
        match result {
            Ok(data) => ApiResult::ok(data),
            Err(error) => ApiResult::failed(&error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ok_result_has_no_error() {
        let result: ApiResult<u32> = Ok(7).into();
        assert!(result.is_ok());
        assert_eq!(result.data, Some(7));
        assert_eq!(result.kind, None);
    }

    #[test]
    fn test_failed_result_carries_kind_and_label() {
        let result: ApiResult<()> = Err(SdkError::RateLimited { retry_after: None }).into();
        assert!(!result.is_ok());
        assert_eq!(result.data, None);
        assert_eq!(result.error.as_deref(), Some("rate limited"));
        assert_eq!(result.kind, Some(ErrorKind::RateLimited));
    }

    #[test]
    fn test_serialized_shape() {
        let result: ApiResult<String> = Err(SdkError::Timeout(Duration::from_secs(5))).into();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"data": null, "error": "timed out", "kind": "timeout"})
        );

        let result = ApiResult::ok(1).map(|n| n + 1);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"data": 2, "error": null})
        );
    }
}
