//! Error types for resource and collection operations.
//!
//! Failures fall into four groups, so callers can branch without picking
//! apart a transport error:
//!
//! - **Usage errors** ([`ResourceError::OperationNotAllowed`],
//!   [`ResourceError::InvalidArguments`]): the call was rejected locally and
//!   no request was sent.
//! - **Precondition errors** ([`ResourceError::FieldsNotLoaded`],
//!   [`ResourceError::MissingUrl`]): the object is not in a state that
//!   allows the operation yet. No request was sent.
//! - **Protocol errors** ([`ResourceError::UnexpectedBody`]): the platform
//!   answered 2xx with a body of the wrong shape.
//! - **Remote errors** ([`ResourceError::Http`]): non-2xx responses and
//!   network failures, with status and body preserved.
//!
//! # Example
//!
//! ```rust,ignore
//! use passaporte_web::rest::ResourceError;
//!
//! match profile.save().await {
//!     Ok(updated) => println!("saved {}", updated.url()),
//!     Err(ResourceError::FieldsNotLoaded { .. }) => {
//!         profile.load_options().await?;
//!     }
//!     Err(e) if e.is_remote() => {
//!         println!("platform said {:?}: {:?}", e.status_code(), e.field_errors());
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```

use std::collections::HashMap;

use crate::clients::HttpError;
use thiserror::Error;

/// Error type for resource and collection operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource kind or collection structurally forbids the operation.
    #[error("{resource} does not allow {operation}")]
    OperationNotAllowed {
        /// The kind of resource or collection (e.g., "Account").
        resource: &'static str,
        /// The operation being attempted (e.g., "delete").
        operation: &'static str,
    },

    /// The arguments given to the operation were missing or unrecognized.
    #[error("Invalid arguments for {resource}::{operation}: {reason}")]
    InvalidArguments {
        /// The kind of resource or collection.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
        /// What was wrong with the arguments.
        reason: String,
    },

    /// `save()` was called before a metadata probe reported mutable fields.
    #[error("{resource} has no known mutable fields; run load_options() first")]
    FieldsNotLoaded {
        /// The kind of resource.
        resource: &'static str,
    },

    /// The operation needs a URL the object does not have.
    #[error("{resource} has no url to {operation}")]
    MissingUrl {
        /// The kind of resource.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
    },

    /// A successful response carried a body of the wrong shape.
    #[error("Unexpected response body for {resource}: {reason}")]
    UnexpectedBody {
        /// The kind of resource or collection.
        resource: &'static str,
        /// What was wrong with the body.
        reason: String,
    },

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ResourceError {
    /// Returns `true` if the call was rejected locally because of how it was made.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::OperationNotAllowed { .. } | Self::InvalidArguments { .. }
        )
    }

    /// Returns `true` if the object was not in a state that allows the call.
    #[must_use]
    pub const fn is_precondition_error(&self) -> bool {
        matches!(self, Self::FieldsNotLoaded { .. } | Self::MissingUrl { .. })
    }

    /// Returns `true` if the error came from the transport or the platform.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Returns the HTTP status code of a non-2xx response.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status_code(),
            _ => None,
        }
    }

    /// Returns the parsed body of a non-2xx response.
    #[must_use]
    pub const fn response_body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Http(HttpError::Response(e)) => Some(&e.body),
            _ => None,
        }
    }

    /// Returns per-field validation messages from a non-2xx response.
    ///
    /// The platform reports rejected writes as a map of field name to a
    /// list of messages; non-field messages are collected under
    /// `non_field_errors` or `detail`.
    #[must_use]
    pub fn field_errors(&self) -> HashMap<String, Vec<String>> {
        self.response_body()
            .map(parse_field_errors)
            .unwrap_or_default()
    }
}

/// Parses validation errors from a response body.
///
/// ```json
/// {
///   "cpf": ["Este número de CPF já está cadastrado."],
///   "detail": "You do not have permission to perform this action."
/// }
/// ```
fn parse_field_errors(body: &serde_json::Value) -> HashMap<String, Vec<String>> {
    let mut result = HashMap::new();

    if let serde_json::Value::Object(map) = body {
        for (field, messages) in map {
            let msgs: Vec<String> = match messages {
                serde_json::Value::Array(arr) => arr
                    .iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect(),
                serde_json::Value::String(s) => vec![s.clone()],
                _ => continue,
            };
            if !msgs.is_empty() {
                result.insert(field.clone(), msgs);
            }
        }
    }

    result
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpResponseError, InvalidHttpRequestError};
    use serde_json::json;

    fn remote(code: u16, body: serde_json::Value) -> ResourceError {
        ResourceError::Http(HttpError::Response(HttpResponseError {
            code,
            message: body.to_string(),
            body,
        }))
    }

    #[test]
    fn test_operation_not_allowed_message() {
        let error = ResourceError::OperationNotAllowed {
            resource: "Account",
            operation: "delete",
        };
        assert_eq!(error.to_string(), "Account does not allow delete");
        assert!(error.is_usage_error());
        assert!(!error.is_remote());
    }

    #[test]
    fn test_classification_is_disjoint() {
        let usage = ResourceError::InvalidArguments {
            resource: "Collection",
            operation: "get",
            reason: "uuid or email is required".to_string(),
        };
        let precondition = ResourceError::FieldsNotLoaded { resource: "Profile" };
        let missing = ResourceError::MissingUrl {
            resource: "Identity",
            operation: "save",
        };
        let http = remote(403, json!({"detail": "Forbidden"}));

        assert!(usage.is_usage_error() && !usage.is_precondition_error());
        assert!(precondition.is_precondition_error() && !precondition.is_usage_error());
        assert!(missing.is_precondition_error());
        assert!(http.is_remote() && !http.is_usage_error() && !http.is_precondition_error());
    }

    #[test]
    fn test_status_code_and_body_preserved() {
        let error = remote(409, json!({"detail": "Conflict"}));
        assert_eq!(error.status_code(), Some(409));
        assert_eq!(error.response_body(), Some(&json!({"detail": "Conflict"})));

        let local = ResourceError::FieldsNotLoaded { resource: "Profile" };
        assert_eq!(local.status_code(), None);
        assert_eq!(local.response_body(), None);
    }

    #[test]
    fn test_invalid_request_is_remote_without_status() {
        let error: ResourceError = HttpError::InvalidRequest(InvalidHttpRequestError::MissingBody {
            method: "put".to_string(),
        })
        .into();
        assert!(error.is_remote());
        assert_eq!(error.status_code(), None);
    }

    #[test]
    fn test_field_errors_from_object_body() {
        let error = remote(
            400,
            json!({
                "cpf": ["Este número de CPF já está cadastrado."],
                "detail": "Not allowed",
                "count": 3
            }),
        );

        let errors = error.field_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["cpf"], vec!["Este número de CPF já está cadastrado."]);
        assert_eq!(errors["detail"], vec!["Not allowed"]);
    }

    #[test]
    fn test_field_errors_empty_for_local_errors() {
        let error = ResourceError::MissingUrl {
            resource: "Account",
            operation: "load",
        };
        assert!(error.field_errors().is_empty());
    }
}
