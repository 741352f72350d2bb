//! # HTTP Client
//!
//! Shared HTTP client wrapper for rate provider adapters.
//!
//! Wraps a [`reqwest::Client`] with a fixed request timeout and maps both
//! transport failures and non-2xx status codes to [`ProviderError`], so each
//! adapter only deals with its own payload shapes.
//!
//! # Examples
//!
//! ```ignore
//! use freight_quote::infrastructure::rates::http_client::HttpClient;
//!
//! let client = HttpClient::new(5000)?;
//! let token: TokenResponse = client.get_with_params(&url, &[("id", "38163")]).await?;
//! ```

use crate::infrastructure::rates::error::{ProviderError, ProviderResult};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest upstream error body kept in error messages.
const MAX_ERROR_BODY: usize = 256;

/// HTTP client wrapper for rate provider adapters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> ProviderResult<Self> {
        Self::with_headers(timeout_ms, HeaderMap::new())
    }

    /// Creates a new HTTP client sending `default_headers` on every request.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the client cannot be created.
    pub fn with_headers(timeout_ms: u64, default_headers: HeaderMap) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ProviderError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request with query parameters and deserializes the JSON
    /// response.
    ///
    /// # Errors
    ///
    /// Returns a transport or status mapped `ProviderError`, or
    /// `ProviderError::Schema` if the body cannot be parsed.
    pub async fn get_with_params<T, P>(&self, url: &str, params: &P) -> ProviderResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Makes a POST request with a JSON body and extra headers.
    ///
    /// # Errors
    ///
    /// Returns a transport or status mapped `ProviderError`, or
    /// `ProviderError::Schema` if the body cannot be parsed.
    pub async fn post_with_headers<T, B>(
        &self,
        url: &str,
        body: &B,
        headers: HeaderMap,
    ) -> ProviderResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Checks the status and deserializes JSON.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ProviderResult<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::schema(format!("failed to parse response: {e}")))
        } else {
            let retry_after_ms = retry_after_ms(&response);
            let body = response.text().await.unwrap_or_default();
            Err(self.map_status_error(status, truncate(&body), retry_after_ms))
        }
    }

    /// Maps a reqwest error to a `ProviderError`.
    fn map_reqwest_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout_with_duration("request timed out", self.timeout_ms)
        } else if error.is_connect() {
            ProviderError::connection(format!("connection failed: {error}"))
        } else if error.is_decode() {
            ProviderError::schema(format!("failed to decode response: {error}"))
        } else {
            ProviderError::connection(format!("HTTP request failed: {error}"))
        }
    }

    /// Maps an HTTP status code to a `ProviderError`.
    fn map_status_error(
        &self,
        status: StatusCode,
        body: &str,
        retry_after_ms: Option<u64>,
    ) -> ProviderError {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(format!("bad request: {body}"))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(format!("authentication failed ({status}): {body}"))
            }
            StatusCode::NOT_FOUND => ProviderError::no_rate_for_lane(format!("not found: {body}")),
            StatusCode::TOO_MANY_REQUESTS => {
                ProviderError::rate_limited("rate limit exceeded", retry_after_ms)
            }
            s if s.is_server_error() => {
                ProviderError::connection(format!("server error ({status}): {body}"))
            }
            _ => ProviderError::schema(format!("unexpected HTTP status ({status}): {body}")),
        }
    }
}

/// Reads a `Retry-After` header expressed in seconds.
fn retry_after_ms(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000))
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => body.get(..idx).unwrap_or(body),
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Pong {
        ok: bool,
    }

    #[tokio::test]
    async fn get_with_params_parses_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(query_param("id", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new(2000).unwrap();
        let pong: Pong = client
            .get_with_params(&format!("{}/ping", server.uri()), &[("id", "7")])
            .await
            .unwrap();
        assert!(pong.ok);
    }

    #[tokio::test]
    async fn post_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("x-apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-apikey", "secret".parse().unwrap());
        let client = HttpClient::new(2000).unwrap();
        let pong: Pong = client
            .post_with_headers(&format!("{}/echo", server.uri()), &serde_json::json!({}), headers)
            .await
            .unwrap();
        assert!(pong.ok);
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let server = MockServer::start().await;
        Mock::given(path("/401"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/429"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;
        Mock::given(path("/503"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpClient::new(2000).unwrap();
        let none: &[(&str, &str)] = &[];

        let err = client
            .get_with_params::<Pong, _>(&format!("{}/401", server.uri()), none)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Authentication { .. }));

        let err = client
            .get_with_params::<Pong, _>(&format!("{}/429", server.uri()), none)
            .await
            .unwrap_err();
        assert_eq!(err.retry_after_ms(), Some(3000));

        let err = client
            .get_with_params::<Pong, _>(&format!("{}/503", server.uri()), none)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn malformed_body_is_schema_error() {
        let server = MockServer::start().await;
        Mock::given(path("/bad"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = HttpClient::new(2000).unwrap();
        let none: &[(&str, &str)] = &[];
        let err = client
            .get_with_params::<Pong, _>(&format!("{}/bad", server.uri()), none)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Schema { .. }));
    }

    #[test]
    fn truncate_long_bodies() {
        let body = "x".repeat(1000);
        assert_eq!(truncate(&body).len(), MAX_ERROR_BODY);
        assert_eq!(truncate("short"), "short");
    }
}
