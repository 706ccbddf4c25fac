//! 日志初始化：基于 `tracing-subscriber` 的环境过滤输出。
//!
//! Logging setup for binaries and host applications.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host. [`init_tracing`] is the default used by the bundled
//! binary.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "typed_api_client=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
