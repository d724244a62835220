//! HTTP transport for Passaporte Web API communication.
//!
//! This module is the transport boundary of the crate: everything above it
//! (resources, collections, the facade) talks to the platform only through
//! [`HttpClient`].
//!
//! # Overview
//!
//! - [`HttpClient`]: the async HTTP client, bound to one [`Session`](crate::Session)
//! - [`HttpRequest`]: a request to be sent to the platform
//! - [`HttpResponse`]: a parsed response, including the final URL
//! - [`HttpMethod`]: GET, POST, PUT, PATCH, DELETE and OPTIONS
//! - [`HttpError`]: everything the transport can fail with
//!
//! # Example
//!
//! ```rust,ignore
//! use passaporte_web::clients::{HttpClient, HttpMethod, HttpRequest};
//!
//! let client = HttpClient::new(config.session(), Some(&config))?;
//!
//! let request = HttpRequest::builder(HttpMethod::Options, "/profile/api/info/1/")
//!     .build()
//!     .unwrap();
//!
//! let response = client.request(request).await?;
//! println!("allowed: {:?}", response.allowed_methods());
//! ```
//!
//! # Retry Behavior
//!
//! None. Platform writes are not known to be idempotent, so every error is
//! returned to the caller as-is.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
