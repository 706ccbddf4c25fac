use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::ApiResult;

/// Outcome of a refresh call. A missing access token counts as a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Exchanges a refresh token for a new token pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshedTokens>;
}

/// Adapts an async closure into a [`TokenRefresher`].
pub struct FnRefresher<F>(F);

pub fn refresher_fn<F, Fut>(f: F) -> FnRefresher<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResult<RefreshedTokens>> + Send,
{
    FnRefresher(f)
}

#[async_trait]
impl<F, Fut> TokenRefresher for FnRefresher<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResult<RefreshedTokens>> + Send,
{
    async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshedTokens> {
        (self.0)(refresh_token.to_string()).await
    }
}
