//! Mock HTTP server setup shared by the integration tests.

#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;
use typed_api_client::auth::{AuthSession, MemoryNavigator, UserProfile};
use typed_api_client::ApiClient;

/// Test fixture that owns a mock server and builds clients pointed at it.
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::builder()
            .base_url(&self.base_url)
            .build()
            .expect("client")
    }

    pub fn client_with_navigator(&self, navigator: Arc<MemoryNavigator>) -> ApiClient {
        ApiClient::builder()
            .base_url(&self.base_url)
            .navigator(navigator)
            .build()
            .expect("client")
    }

    /// JSON response for `method path`, whatever the headers.
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// JSON response for requests carrying `Authorization: Bearer <token>`.
    pub async fn mock_with_token(
        &mut self,
        method: &str,
        path: &str,
        token: &str,
        status: usize,
        body: &str,
    ) -> Mock {
        self.server
            .mock(method, path)
            .match_header("authorization", Matcher::Exact(format!("Bearer {}", token)))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// `POST /auth/refresh` for `refresh_token`, expected exactly `hits` times.
    pub async fn mock_refresh(
        &mut self,
        refresh_token: &str,
        status: usize,
        body: &str,
        hits: usize,
    ) -> Mock {
        self.server
            .mock("POST", "/auth/refresh")
            .match_body(Matcher::PartialJson(
                serde_json::json!({ "refreshToken": refresh_token }),
            ))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }
}

pub fn session(access: &str, refresh: &str) -> AuthSession {
    AuthSession {
        profile: UserProfile {
            id: 1,
            username: "emilys".into(),
            email: "emily.johnson@x.dummyjson.com".into(),
            first_name: "Emily".into(),
            last_name: "Johnson".into(),
            gender: "female".into(),
            image: String::new(),
        },
        access_token: access.into(),
        refresh_token: refresh.into(),
    }
}

pub const TODO_1: &str = r#"{"id":1,"todo":"Do something nice for someone you care about","completed":false,"userId":152}"#;
