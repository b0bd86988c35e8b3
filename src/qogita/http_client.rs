//! HTTP client for the Qogita REST API
//!
//! Thin wrapper over `reqwest` that resolves paths against the base URL,
//! attaches the session bearer token and turns every non-2xx response into
//! `ApiError::Status`. There is no retry or backoff.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::models::Session;
use super::traits::{ApiError, ApiResult};

/// Longest body excerpt carried in a parse error
const BODY_EXCERPT_CHARS: usize = 500;

/// HTTP client bound to one API base URL
#[derive(Clone)]
pub struct ApiHttpClient {
    /// Inner HTTP client
    client: Client,

    /// Base URL without trailing slash
    base_url: String,

    /// Connect and request timeout, `None` waits indefinitely
    timeout: Option<Duration>,
}

impl ApiHttpClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://api.qogita.com`
    /// * `timeout` - Connect and per-request timeout, `None` to wait indefinitely
    pub fn new(base_url: &str, timeout: Option<Duration>) -> ApiResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = Client::builder()
            .user_agent(concat!("qogita-deals-export/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout).timeout(timeout);
        }

        Ok(ApiHttpClient {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Build a GET request
    pub fn get(&self, path: &str) -> ApiRequestBuilder {
        self.request(Method::GET, path)
    }

    /// Build a POST request
    pub fn post(&self, path: &str) -> ApiRequestBuilder {
        self.request(Method::POST, path)
    }

    /// Build a PATCH request
    pub fn patch(&self, path: &str) -> ApiRequestBuilder {
        self.request(Method::PATCH, path)
    }

    fn request(&self, method: Method, path: &str) -> ApiRequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        ApiRequestBuilder {
            builder: self.client.request(method.clone(), &url),
            method,
            url,
        }
    }
}

/// Request builder wrapper that enforces the status policy on send
pub struct ApiRequestBuilder {
    builder: RequestBuilder,
    method: Method,
    url: String,
}

impl ApiRequestBuilder {
    /// Authorize the request with the session's bearer token
    pub fn bearer_auth(mut self, session: &Session) -> Self {
        self.builder = self.builder.bearer_auth(&session.access_token);
        self
    }

    /// Add JSON body to the request
    pub fn json<T: serde::Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.builder = self.builder.json(json);
        self
    }

    /// Append query parameters; repeated keys are kept
    pub fn query<T: serde::Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    /// Send the request, failing on any non-success status
    pub async fn send(self) -> ApiResult<Response> {
        debug!(method = %self.method, url = %self.url, "Qogita API request");

        let response = self.builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Send the request and decode the JSON body
    pub async fn send_json<T: DeserializeOwned>(self) -> ApiResult<T> {
        let response = self.send().await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            let excerpt: String = text.chars().take(BODY_EXCERPT_CHARS).collect();
            ApiError::Parse(format!("JSON parse error: {} - Body: {}", e, excerpt))
        })
    }
}
