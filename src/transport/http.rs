use super::{RequestParts, TransportError};
use crate::config::ClientConfig;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::Proxy;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout()))
            // Conservative HTTP/2 keepalive defaults for long-lived connections.
            .http2_adaptive_window(true)
            .http2_keep_alive_interval(Some(Duration::from_secs(30)))
            .http2_keep_alive_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL: {}", e),
                    ErrorContext::new().with_field_path("proxy_url"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send one request. Non-2xx statuses come back as
    /// [`TransportError::Status`]; a fired cancellation token yields
    /// [`Error::Cancelled`].
    pub async fn send(
        &self,
        request: &RequestParts,
        cancel: Option<&CancellationToken>,
    ) -> Result<RawResponse> {
        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Error::Cancelled),
                    result = self.exchange(request) => result,
                }
            }
            None => self.exchange(request).await,
        }
    }

    async fn exchange(&self, request: &RequestParts) -> Result<RawResponse> {
        let url = self.url_for(&request.path);
        let mut req = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());

        if let Some(query) = &request.query {
            req = req.query(query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = response.status();
        debug!(
            http_status = status.as_u16(),
            method = %request.method,
            path = request.path.as_str(),
            "response received"
        );

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        if !status.is_success() {
            return Err(Error::Transport(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }));
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}
