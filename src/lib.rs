//! # typed-api-client
//!
//! 基于 API 模式的强类型 HTTP 客户端，支持单次飞行（single-flight）令牌刷新。
//!
//! Typed HTTP API client with authenticated single-flight token refresh.
//!
//! ## Overview
//!
//! Every call is checked at compile time against the API schema: path,
//! method, path parameters, query parameters, request body and response
//! shape. At runtime the client survives access-token expiry by routing all
//! concurrent 401s through exactly one refresh call, then replaying them.
//!
//! ## Key Features
//!
//! - **Schema projection**: [`api_schema!`] declares paths; [`schema::Operation`]
//!   carries the per-method shapes
//! - **Typed client**: [`ApiClient`] with `get`/`post`/`put`/`patch`/`delete`
//! - **Interceptors**: explicit ordered pipeline, see [`interceptors`]
//! - **Auth**: [`auth::AuthCoordinator`] with persisted credentials and login redirects
//! - **Errors**: one normalized [`ApiError`] with classification predicates
//! - **Resilience**: [`resilience::RetryPolicy`] for server and network failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use typed_api_client::api::{auth, todos};
//! use typed_api_client::{ApiClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> typed_api_client::Result<()> {
//!     let client = ApiClient::new(ClientConfig::from_env()?)?;
//!     auth::login(&client, &auth::LoginRequest::new("emilys", "emilyspass")).await?;
//!
//!     let todo = todos::get(&client, 7).await?;
//!     println!("{} done={}", todo.todo, todo.completed);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`schema`] | Compile-time schema projection and schema documents |
//! | [`client`] | Typed client and builder |
//! | [`interceptors`] | Request/response interceptor pipeline |
//! | [`transport`] | reqwest-backed HTTP transport |
//! | [`auth`] | Credentials, refresh coordination, redirects |
//! | [`resilience`] | Retry/backoff policy |
//! | [`api`] | DummyJSON bindings |

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod interceptors;
pub mod resilience;
pub mod schema;
pub mod telemetry;
pub mod transport;

// Re-export main types for convenience
pub use client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use config::ClientConfig;
pub use tokio_util::sync::CancellationToken;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a call through the typed client.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error type for the library
pub mod error;
pub use error::{error_message, normalize, ApiError, Error, ErrorContext, ErrorKind};
