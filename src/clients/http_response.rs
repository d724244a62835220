//! HTTP response types for the Passaporte Web client.
//!
//! [`HttpResponse`] keeps the status, the lower-cased headers, the parsed
//! JSON body and the final URL the response came from. The final URL is
//! what a payload without its own `url` key is addressed by.

use std::collections::HashMap;

use crate::clients::http_request::HttpMethod;

/// A parsed response from the platform.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lower-cased name.
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed JSON body (`{}` when the body was empty).
    pub body: serde_json::Value,
    /// The URL of the response, after any redirects.
    pub url: String,
}

impl HttpResponse {
    /// Creates a new response.
    #[must_use]
    pub fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
        url: impl Into<String>,
    ) -> Self {
        Self {
            code,
            headers,
            body,
            url: url.into(),
        }
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the methods listed in the `Allow` header.
    ///
    /// Unknown tokens are skipped. An absent header yields an empty list.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<HttpMethod> {
        self.headers
            .get("allow")
            .into_iter()
            .flatten()
            .flat_map(|value| value.split(','))
            .filter_map(|token| token.parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_with_headers(headers: &[(&str, &str)]) -> HttpResponse {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in headers {
            map.entry((*key).to_string())
                .or_default()
                .push((*value).to_string());
        }
        HttpResponse::new(200, map, json!({}), "http://localhost/x/")
    }

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in [200, 201, 204, 299] {
            let response = HttpResponse::new(code, HashMap::new(), json!({}), "");
            assert!(response.is_ok(), "{code} should be ok");
        }
    }

    #[test]
    fn test_is_ok_returns_false_for_4xx_and_5xx() {
        for code in [301, 400, 401, 403, 404, 409, 500, 503] {
            let response = HttpResponse::new(code, HashMap::new(), json!({}), "");
            assert!(!response.is_ok(), "{code} should not be ok");
        }
    }

    #[test]
    fn test_allowed_methods_parses_allow_header() {
        let response = response_with_headers(&[("allow", "GET, PUT, DELETE, HEAD, OPTIONS")]);
        assert_eq!(
            response.allowed_methods(),
            vec![
                HttpMethod::Get,
                HttpMethod::Put,
                HttpMethod::Delete,
                HttpMethod::Options
            ]
        );
    }

    #[test]
    fn test_allowed_methods_empty_without_header() {
        let response = response_with_headers(&[]);
        assert!(response.allowed_methods().is_empty());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = response_with_headers(&[("content-type", "application/json")]);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }
}
