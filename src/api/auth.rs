//! `/auth` resource, plus the default token refresher.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::auth::{AuthSession, RefreshedTokens, TokenRefresher, UserProfile};
use crate::client::{ApiClient, RequestOptions};
use crate::config::ClientConfig;
use crate::error::normalize;
use crate::schema::ApiPath;
use crate::transport::{HttpTransport, RequestParts};
use crate::{ApiError, ApiResult, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_mins: Option<u32>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            expires_in_mins: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_mins: Option<u32>,
}

crate::api_schema! {
    /// `/auth/login`
    pub AuthLogin = "/auth/login" {
        Post => { body: LoginRequest, response: AuthSession },
    }

    /// `/auth/refresh`
    pub AuthRefresh = "/auth/refresh" {
        Post => { body: RefreshRequest, response: RefreshedTokens },
    }

    /// `/auth/me`
    pub AuthMe = "/auth/me" {
        Get => { response: UserProfile },
    }
}

/// Log in and install the returned session on the client.
pub async fn login(client: &ApiClient, request: &LoginRequest) -> ApiResult<AuthSession> {
    let session = client
        .post::<AuthLogin>(&(), request, RequestOptions::default())
        .await?;
    client.auth().sign_in(session.clone());
    Ok(session)
}

pub fn logout(client: &ApiClient) {
    client.auth().sign_out();
}

/// Profile of the signed-in user.
pub async fn me(client: &ApiClient) -> ApiResult<UserProfile> {
    client.get::<AuthMe>(&(), RequestOptions::default()).await
}

/// Calls `POST /auth/refresh` on a transport of its own, outside the
/// interceptor pipeline, so a failing refresh is never itself intercepted.
pub struct RemoteRefresher {
    transport: HttpTransport,
    expires_in_mins: Option<u32>,
}

impl RemoteRefresher {
    pub fn with_expiry(mut self, minutes: u32) -> Self {
        self.expires_in_mins = Some(minutes);
        self
    }
}

pub fn remote_refresher(config: &ClientConfig) -> Result<RemoteRefresher> {
    Ok(RemoteRefresher {
        transport: HttpTransport::new(config)?,
        expires_in_mins: None,
    })
}

#[async_trait]
impl TokenRefresher for RemoteRefresher {
    async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshedTokens> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
            expires_in_mins: self.expires_in_mins,
        };
        let mut req = RequestParts::new(Method::POST, AuthRefresh::TEMPLATE);
        req.headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        req.body = Some(serde_json::to_value(&body).map_err(Error::from)?);

        debug!(path = AuthRefresh::TEMPLATE, "requesting new token pair");
        let response = self.transport.send(&req, None).await.map_err(normalize)?;
        response.json::<RefreshedTokens>().map_err(ApiError::from)
    }
}
