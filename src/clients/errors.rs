//! HTTP-specific error types for the Passaporte Web client.
//!
//! - [`HttpResponseError`]: non-2xx responses from the platform
//! - [`InvalidHttpRequestError`]: a request that fails validation before sending
//! - [`HttpError`]: unified error type for everything the transport can report
//!
//! The client never retries. Every failure is returned to the caller with
//! the status code and body intact.
//!
//! # Example
//!
//! ```rust,ignore
//! use passaporte_web::clients::HttpError;
//!
//! match client.request(request).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Response(e)) => {
//!         println!("API error {}: {}", e.code, e.message);
//!     }
//!     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {e}"),
//!     Err(HttpError::Network(e)) => println!("Network error: {e}"),
//! }
//! ```

use thiserror::Error;

/// Error returned when a request receives a non-successful response.
///
/// `message` is the raw response text; `body` is the same content parsed as
/// JSON, or `{"raw_body": ...}` when it was not JSON.
#[derive(Debug, Error)]
#[error("Request failed with status {code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The raw response body.
    pub message: String,
    /// The parsed response body.
    pub body: serde_json::Value,
}

/// Error returned when an HTTP request fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The method token is not one the client knows.
    #[error("Invalid Http method {method}.")]
    InvalidMethod {
        /// The token that was provided.
        method: String,
    },

    /// A POST, PUT or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the status code when the platform answered with an error.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_response_error_includes_status_and_body() {
        let error = HttpResponseError {
            code: 404,
            message: r#"{"detail":"Not found."}"#.to_string(),
            body: json!({"detail": "Not found."}),
        };
        assert_eq!(
            error.to_string(),
            r#"Request failed with status 404: {"detail":"Not found."}"#
        );
        assert_eq!(error.body["detail"], "Not found.");
    }

    #[test]
    fn test_invalid_request_error_missing_body() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "post".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use post without specifying data.");
    }

    #[test]
    fn test_status_code_only_for_responses() {
        let response: HttpError = HttpResponseError {
            code: 409,
            message: String::new(),
            body: json!({}),
        }
        .into();
        assert_eq!(response.status_code(), Some(409));

        let invalid: HttpError = InvalidHttpRequestError::MissingBody {
            method: "put".to_string(),
        }
        .into();
        assert_eq!(invalid.status_code(), None);
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let error: &dyn std::error::Error = &InvalidHttpRequestError::MissingBody {
            method: "patch".to_string(),
        };
        let _ = error;
    }
}
