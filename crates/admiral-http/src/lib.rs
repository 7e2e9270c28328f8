//! Outbound HTTP client abstraction.
//!
//! One contract, two backends: [`ReqwestHttpClient`] (pooled, TLS-capable)
//! and [`HyperHttpClient`] (a thin hand-driven HTTP/1.1 client). Both run
//! the same preparation pipeline (URL join, request-id injection) and the
//! same retry driver, so callers can swap backends without behavior
//! changes.
//!
//! Retries are gated on idempotency: only GET/HEAD requests, or requests
//! carrying an `Idempotency-Key` header, are ever re-sent. A failed
//! non-idempotent write surfaces its first error untouched.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod common;
pub mod hyper_client;
pub mod reqwest_client;
pub mod retry;

pub use hyper_client::HyperHttpClient;
pub use reqwest_client::ReqwestHttpClient;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Normalized failure for an outbound call, regardless of backend.
/// Returned only after the retry budget is exhausted.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout { request_id: Option<String> },

    #[error("transport error: {message}")]
    Transport {
        message: String,
        request_id: Option<String>,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        /// Provider-specific error code extracted from the body.
        code: Option<String>,
        request_id: Option<String>,
        response: serde_json::Value,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response decode failed: {0}")]
    Decode(String),
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Timeout { request_id }
            | Self::Transport { request_id, .. }
            | Self::Status { request_id, .. } => request_id.as_deref(),
            Self::InvalidRequest(_) | Self::Decode(_) => None,
        }
    }
}

/// One outbound request. `url` may be absolute or a path joined onto
/// the client's base URL.
#[derive(Debug, Clone)]
pub struct HttpRequestConfig {
    pub method: Method,
    pub url: String,
    /// Overrides the client-wide base URL for this call.
    pub base_url: Option<String>,
    pub headers: HashMap<String, String>,
    pub params: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Overrides the client-wide timeout for this call.
    pub timeout: Option<Duration>,
}

impl HttpRequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            base_url: None,
            headers: HashMap::new(),
            params: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Mark this request safe to retry even though its method is not.
    pub fn idempotency_key(self, key: impl Into<String>) -> Self {
        self.header(IDEMPOTENCY_KEY_HEADER, key)
    }
}

/// Normalized successful response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub data: serde_json::Value,
    pub status: u16,
    /// Header names lower-cased.
    pub headers: HashMap<String, String>,
    pub request_id: Option<String>,
}

impl HttpResponse {
    /// Deserialize the body into a concrete type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_value(self.data.clone()).map_err(|e| HttpError::Decode(e.to_string()))
    }
}

/// Construction-time settings shared by both backends.
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// Additional attempts after the first; 0 disables retries.
    pub max_retries: u32,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(10),
            max_retries: 1,
        }
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(&self, config: HttpRequestConfig) -> Result<HttpResponse, HttpError>;
}
