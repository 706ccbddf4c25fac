//! Credentials, token refresh and login redirects.
//!
//! [`AuthCoordinator`] is installed as the last interceptor of the client
//! pipeline. It attaches `Authorization: Bearer <token>` to outbound requests
//! and, when a request fails with 401, runs at most one refresh call no matter
//! how many requests are failing at the same time. Every request that hit the
//! 401 is replayed once with the new token, or rejected with a
//! session-expired error when the refresh fails.

mod coordinator;
mod navigator;
mod refresher;
mod storage;
mod store;

pub use coordinator::AuthCoordinator;
pub use navigator::{login_href, MemoryNavigator, Navigator};
pub use refresher::{refresher_fn, FnRefresher, RefreshedTokens, TokenRefresher};
pub use storage::{CredentialStorage, FileStorage, KeyringStorage, MemoryStorage};
pub use store::{AuthSession, AuthStore, Credentials, UserProfile};
