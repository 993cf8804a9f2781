//! Errors returned by the Management API

use std::fmt;

/// Error type for Management API calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network or connection error
    Network(String),
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden (includes server message if any)
    Forbidden(String),
    /// 404 Not Found (includes server message if any)
    NotFound(String),
    /// 400 Bad Request (includes server error message)
    BadRequest(String),
    /// 5xx or other unexpected status
    ServerError(String),
    /// Response could not be parsed as expected
    InvalidResponse(String),
    /// Request could not be built (bad URL or body)
    InvalidRequest(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Unauthorized => write!(
                f,
                "authentication failed (401). The access token may be expired; \
                 set a fresh one in GA_ACCESS_TOKEN or the config file."
            ),
            ApiError::Forbidden(msg) => write!(f, "access denied (403): {msg}"),
            ApiError::NotFound(msg) => write!(f, "not found: {msg}"),
            ApiError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            ApiError::ServerError(msg) => write!(f, "server error: {msg}"),
            ApiError::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
            ApiError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Pull the human-readable message out of a Google API error body, if there is one
pub(crate) fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_from_google_error() {
        let body = r#"{"error":{"code":403,"message":"User does not have permission"}}"#;
        assert_eq!(extract_message(body), "User does not have permission");
    }

    #[test]
    fn test_extract_message_falls_back_to_body() {
        assert_eq!(extract_message(" gateway timeout \n"), "gateway timeout");
    }
}
