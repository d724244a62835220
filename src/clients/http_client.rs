//! HTTP client for Passaporte Web API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests to the platform.

use std::collections::HashMap;

use crate::auth::{Credentials, Session};
use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::PassaporteConfig;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the platform.
///
/// The client handles:
/// - Resolving relative locators against the session host
/// - HTTP Basic auth from the session credentials
/// - Default headers including User-Agent
/// - JSON body encoding and decoding
///
/// Non-2xx responses are returned as [`HttpError::Response`] and never
/// retried.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`. Resources and collections share one
/// client through an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use passaporte_web::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let client = HttpClient::new(config.session(), Some(&config))?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/organizations/api/accounts/")
///     .build()
///     .unwrap();
///
/// let response = client.request(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URI (e.g., `http://sandbox.app.passaporteweb.com.br`).
    base_uri: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Host and credentials.
    session: Session,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the given session.
    ///
    /// `config` only contributes the user agent prefix; the host and
    /// credentials always come from the session.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client
    /// cannot be created (e.g. TLS initialization failure).
    pub fn new(session: Session, config: Option<&PassaporteConfig>) -> Result<Self, HttpError> {
        let base_uri = session.host().origin().to_string();

        let user_agent_prefix = config
            .and_then(PassaporteConfig::user_agent_prefix)
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}Passaporte Web Rust Client v{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_uri,
            default_headers,
            session,
        })
    }

    /// Returns a client for the same host bound to other credentials.
    ///
    /// The connection pool is shared; `self` keeps its own credentials.
    #[must_use]
    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            client: self.client.clone(),
            base_uri: self.base_uri.clone(),
            default_headers: self.default_headers.clone(),
            session: self.session.with_credentials(credentials),
        }
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the session this client authenticates with.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Resolves a locator into an absolute URL.
    ///
    /// Absolute locators are returned unchanged; anything else is joined
    /// onto the base URI.
    #[must_use]
    pub fn resolve_url(&self, locator: &str) -> String {
        if locator.contains("://") {
            locator.to_string()
        } else if locator.starts_with('/') {
            format!("{}{locator}", self.base_uri)
        } else {
            format!("{}/{locator}", self.base_uri)
        }
    }

    /// Sends an HTTP request to the platform.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.resolve_url(&request.url);
        let (username, password) = self.session.credentials().basic_auth();

        let mut req_builder = self
            .client
            .request(request.http_method.as_reqwest(), &url)
            .basic_auth(username, password);

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                req_builder = req_builder.header(key, value);
            }
        }

        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let final_url = res.url().to_string();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await?;

        tracing::debug!(
            method = %request.http_method,
            url = %url,
            status = code,
            "Passaporte Web request completed"
        );

        let body = Self::parse_body(&body_text);

        if (200..300).contains(&code) {
            return Ok(HttpResponse::new(code, res_headers, body, final_url));
        }

        Err(HttpError::Response(HttpResponseError {
            code,
            message: body_text,
            body,
        }))
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn get(
        &self,
        url: &str,
        query: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError> {
        let mut builder = HttpRequest::builder(HttpMethod::Get, url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        self.request(builder.build()?).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn post(&self, url: &str, body: serde_json::Value) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Post, url).body(body).build()?;
        self.request(request).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn put(&self, url: &str, body: serde_json::Value) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Put, url).body(body).build()?;
        self.request(request).await
    }

    /// Sends a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn patch(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Patch, url)
            .body(body)
            .build()?;
        self.request(request).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn delete(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Delete, url).build()?;
        self.request(request).await
    }

    /// Sends an OPTIONS metadata probe.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn options(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Options, url).build()?;
        self.request(request).await
    }

    /// Parses a response body: empty becomes `{}`, non-JSON is kept raw.
    fn parse_body(body_text: &str) -> serde_json::Value {
        if body_text.trim().is_empty() {
            return serde_json::json!({});
        }
        serde_json::from_str(body_text)
            .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
