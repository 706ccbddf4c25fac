//! HTTP transport: the request shape the interceptor chain operates on, and the
//! reqwest-backed executor that sends it.

mod http;

pub use http::{HttpTransport, RawResponse};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use tracing::warn;

/// A fully-resolved request, owned so it can be replayed.
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub method: Method,
    /// Path relative to the base URL, placeholders already substituted.
    pub path: String,
    pub query: Option<serde_json::Value>,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
    /// Set before a replay so a second failure is surfaced instead of looping.
    pub retried: bool,
}

impl RequestParts {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            headers: HeaderMap::new(),
            retried: false,
        }
    }

    /// The bearer token this request carries, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    /// A token that is not a legal header value removes the header instead,
    /// so the request never goes out with a stale bearer.
    pub fn set_bearer_token(&mut self, token: &str) {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                warn!(path = self.path.as_str(), "access token is not a valid header value, dropping Authorization");
                self.headers.remove(AUTHORIZATION);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {status}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Other(String),
}
