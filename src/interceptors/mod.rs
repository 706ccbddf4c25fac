//! Ordered request/response interceptor pipeline.
//!
//! - Outbound: every interceptor's `on_request` runs in registration order.
//! - Inbound: a success passes through untouched. A failure is normalized to
//!   [`ApiError`] first, then offered to each interceptor in registration order;
//!   each one either passes the error on or asks for the request to be replayed.
//!   A replay re-enters the outbound stage.
//! - Cancellation covers the inbound stage too: a call parked there (for
//!   example waiting on a token refresh) is rejected as soon as its token fires.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{normalize, ApiError};
use crate::transport::{HttpTransport, RawResponse, RequestParts};

/// What the inbound stage decided for a failed exchange.
#[derive(Debug)]
pub enum ResponseAction {
    /// Pass the error on to the next interceptor, and finally to the caller.
    Reject(ApiError),
    /// Send this request again through the whole pipeline.
    Replay(RequestParts),
}

#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_request(&self, _req: &mut RequestParts) {}

    async fn on_error(&self, _req: &RequestParts, err: ApiError) -> ResponseAction {
        ResponseAction::Reject(err)
    }
}

/// Sets `Accept: application/json` on every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptJson;

#[async_trait]
impl Interceptor for AcceptJson {
    fn name(&self) -> &'static str {
        "accept_json"
    }

    async fn on_request(&self, req: &mut RequestParts) {
        req.headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
    }
}

pub struct InterceptorPipeline {
    pub(crate) interceptors: Vec<Box<dyn Interceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn push(&mut self, interceptor: Box<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Run one call through the pipeline until it succeeds or is rejected.
    pub async fn execute(
        &self,
        transport: &HttpTransport,
        mut req: RequestParts,
        cancel: Option<&CancellationToken>,
    ) -> Result<RawResponse, ApiError> {
        loop {
            for ic in &self.interceptors {
                ic.on_request(&mut req).await;
            }

            let err = match transport.send(&req, cancel).await {
                Ok(resp) => return Ok(resp),
                Err(raw) => normalize(raw),
            };

            warn!(
                http_status = err.status_code(),
                method = %req.method,
                path = req.path.as_str(),
                retried = req.retried,
                "API error: {}",
                err.message()
            );

            let inbound = self.inbound(&req, err);
            let action = match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => ResponseAction::Reject(ApiError::cancelled()),
                        action = inbound => action,
                    }
                }
                None => inbound.await,
            };

            match action {
                ResponseAction::Reject(err) => return Err(err),
                ResponseAction::Replay(next) => req = next,
            }
        }
    }
}

impl InterceptorPipeline {
    async fn inbound(&self, req: &RequestParts, err: ApiError) -> ResponseAction {
        let mut action = ResponseAction::Reject(err);
        for ic in &self.interceptors {
            let ResponseAction::Reject(err) = action else {
                break;
            };
            action = ic.on_error(req, err).await;
        }
        action
    }
}

impl Default for InterceptorPipeline {
    fn default() -> Self {
        Self::new()
    }
}
