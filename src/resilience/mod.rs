//! 弹性模式模块：瞬时故障的重试与退避策略。
//!
//! # Resilience Module
//!
//! Retry/backoff policy for transient failures. The auth coordinator handles
//! 401s inside the client pipeline; this policy governs a separate, coarser
//! retry loop around whole calls (server errors and network failures only).
//!
//! ```rust
//! use std::time::Duration;
//! use typed_api_client::resilience::RetryPolicy;
//! use typed_api_client::ApiError;
//!
//! let policy = RetryPolicy::default();
//! assert!(policy.should_retry(1, &ApiError::new("boom", 503)));
//! assert!(!policy.should_retry(3, &ApiError::new("boom", 503)));
//! assert!(!policy.should_retry(1, &ApiError::new("invalid", 422)));
//! assert_eq!(policy.backoff_delay(2), Duration::from_millis(4000));
//! ```

pub mod retry;

pub use retry::{Decision, RetryPolicy};
