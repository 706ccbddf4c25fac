use async_trait::async_trait;
use futures::FutureExt;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::navigator::{login_href, Navigator};
use super::refresher::{RefreshedTokens, TokenRefresher};
use super::store::{AuthSession, AuthStore};
use crate::config::ClientConfig;
use crate::interceptors::{Interceptor, ResponseAction};
use crate::transport::RequestParts;
use crate::{ApiError, ApiResult};

/// A caller suspended until the in-flight refresh settles.
struct PendingRequest {
    path: String,
    tx: oneshot::Sender<ApiResult<String>>,
}

enum RefreshState {
    Idle,
    /// FIFO queue of every request waiting on the refresh, the trigger included.
    Refreshing(VecDeque<PendingRequest>),
}

/// Result of inspecting the refresh state for one failed request.
enum Join {
    Wait(oneshot::Receiver<ApiResult<String>>),
    /// A newer token than the one the request carried is already installed.
    Replay(String),
    NoRefreshToken,
}

struct Inner {
    store: AuthStore,
    refresher: Arc<dyn TokenRefresher>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<RefreshState>,
    auth_path_prefix: String,
    login_route: String,
    exempt_endpoints: Vec<String>,
    refresh_calls: AtomicU64,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn redirect_to_login(&self) {
        let location = self.navigator.current_path();
        if location.starts_with(&self.auth_path_prefix) {
            debug!(location = location.as_str(), "already on an auth page, not redirecting");
            return;
        }
        let href = login_href(&self.login_route, Some(&location));
        info!(href = href.as_str(), "redirecting to login");
        self.navigator.navigate(&href);
    }

    fn expire_session(&self) {
        self.store.clear();
        self.redirect_to_login();
    }

    async fn run_refresh(self: Arc<Self>, refresh_token: String) {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        info!("access token expired, refreshing");

        let result = AssertUnwindSafe(self.refresher.refresh(&refresh_token))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(ApiError::network("token refresher panicked")));

        let outcome = match result {
            Ok(RefreshedTokens {
                access_token: Some(access_token),
                refresh_token: rotated,
            }) if !access_token.is_empty() => {
                if !self.store.update_tokens(access_token.clone(), rotated) {
                    debug!("signed out during refresh, new token not stored");
                }
                Ok(access_token)
            }
            Ok(_) => {
                warn!("refresh response carried no access token");
                Err(ApiError::session_expired())
            }
            Err(e) => {
                warn!(http_status = e.status_code(), "token refresh failed: {}", e.message());
                Err(ApiError::session_expired())
            }
        };

        // Credentials must be settled before the state returns to Idle.
        if outcome.is_err() {
            self.store.clear();
        }

        let waiters = match std::mem::replace(&mut *self.state(), RefreshState::Idle) {
            RefreshState::Refreshing(queue) => queue,
            RefreshState::Idle => VecDeque::new(),
        };
        debug!(waiters = waiters.len(), success = outcome.is_ok(), "refresh settled");
        for waiter in waiters {
            // A receiver is gone when its caller was cancelled or dropped.
            if waiter.tx.send(outcome.clone()).is_err() {
                debug!(path = waiter.path.as_str(), "waiter went away before the refresh settled");
            }
        }

        if outcome.is_err() {
            self.redirect_to_login();
        }
    }
}

/// Owns the credentials, injects the bearer header and runs the single-flight
/// refresh protocol for requests that fail with 401.
///
/// Cloning yields another handle to the same coordinator.
#[derive(Clone)]
pub struct AuthCoordinator {
    inner: Arc<Inner>,
}

impl AuthCoordinator {
    pub fn new(
        store: AuthStore,
        refresher: Arc<dyn TokenRefresher>,
        navigator: Arc<dyn Navigator>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                refresher,
                navigator,
                state: Mutex::new(RefreshState::Idle),
                auth_path_prefix: config.auth_path_prefix.clone(),
                login_route: config.login_route.clone(),
                exempt_endpoints: config.exempt_endpoints.clone(),
                refresh_calls: AtomicU64::new(0),
            }),
        }
    }

    /// Read-only access to the credentials.
    pub fn store(&self) -> &AuthStore {
        &self.inner.store
    }

    /// Install the session returned by a successful login.
    pub fn sign_in(&self, session: AuthSession) {
        info!(user = session.profile.username.as_str(), "signed in");
        self.inner.store.set_session(Some(session));
    }

    pub fn sign_out(&self) {
        info!("signed out");
        self.inner.store.clear();
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.inner.state(), RefreshState::Refreshing(_))
    }

    /// Number of refresh calls made so far.
    pub fn refresh_count(&self) -> u64 {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    fn is_exempt(&self, path: &str) -> bool {
        self.inner
            .exempt_endpoints
            .iter()
            .any(|endpoint| path.contains(endpoint.as_str()))
    }

    fn join(&self, req: &RequestParts) -> Join {
        let mut state = self.inner.state();
        match &mut *state {
            RefreshState::Refreshing(queue) => {
                let (tx, rx) = oneshot::channel();
                queue.push_back(PendingRequest {
                    path: req.path.clone(),
                    tx,
                });
                debug!(queued = queue.len(), path = req.path.as_str(), "refresh in flight, queued");
                Join::Wait(rx)
            }
            RefreshState::Idle => {
                if let Some(current) = self.inner.store.access_token() {
                    if req.bearer_token() != Some(current.as_str()) {
                        return Join::Replay(current);
                    }
                }
                let Some(refresh_token) = self.inner.store.refresh_token() else {
                    return Join::NoRefreshToken;
                };
                let (tx, rx) = oneshot::channel();
                *state = RefreshState::Refreshing(VecDeque::from([PendingRequest {
                    path: req.path.clone(),
                    tx,
                }]));
                tokio::spawn(self.inner.clone().run_refresh(refresh_token));
                Join::Wait(rx)
            }
        }
    }

    async fn handle_unauthorized(&self, req: &RequestParts, err: ApiError) -> ResponseAction {
        let replay_with = |token: &str| {
            let mut replay = req.clone();
            replay.retried = true;
            replay.set_bearer_token(token);
            ResponseAction::Replay(replay)
        };

        match self.join(req) {
            Join::Replay(token) => {
                debug!(path = req.path.as_str(), "token already refreshed, replaying");
                replay_with(&token)
            }
            Join::NoRefreshToken => {
                warn!(
                    path = req.path.as_str(),
                    "401 without a refresh token: {}",
                    err.message()
                );
                self.inner.expire_session();
                ResponseAction::Reject(ApiError::session_expired())
            }
            Join::Wait(rx) => match rx.await {
                Ok(Ok(token)) => replay_with(&token),
                Ok(Err(e)) => ResponseAction::Reject(e),
                Err(_) => ResponseAction::Reject(ApiError::session_expired()),
            },
        }
    }
}

#[async_trait]
impl Interceptor for AuthCoordinator {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn on_request(&self, req: &mut RequestParts) {
        if let Some(token) = self.inner.store.access_token() {
            req.set_bearer_token(&token);
        }
    }

    async fn on_error(&self, req: &RequestParts, err: ApiError) -> ResponseAction {
        if err.is_unauthorized() && !err.is_session_expired() && !req.retried && !self.is_exempt(&req.path) {
            return self.handle_unauthorized(req, err).await;
        }
        ResponseAction::Reject(err)
    }
}

#[cfg(test)]
mod tests {
    use super::super::navigator::MemoryNavigator;
    use super::super::refresher::refresher_fn;
    use super::super::storage::MemoryStorage;
    use super::super::store::UserProfile;
    use super::*;
    use reqwest::Method;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn session(access: &str, refresh: &str) -> AuthSession {
        AuthSession {
            profile: UserProfile::default(),
            access_token: access.into(),
            refresh_token: refresh.into(),
        }
    }

    fn coordinator(
        refresher: Arc<dyn TokenRefresher>,
        navigator: Arc<MemoryNavigator>,
    ) -> AuthCoordinator {
        let store = AuthStore::rehydrate(Arc::new(MemoryStorage::new()), "auth-storage").unwrap();
        AuthCoordinator::new(
            store,
            refresher,
            navigator,
            &ClientConfig::new("http://localhost"),
        )
    }

    struct NeverRefresh;

    #[async_trait]
    impl TokenRefresher for NeverRefresh {
        async fn refresh(&self, _refresh_token: &str) -> ApiResult<RefreshedTokens> {
            panic!("refresh must not be called")
        }
    }

    fn sent_with(token: &str) -> RequestParts {
        let mut req = RequestParts::new(Method::GET, "/todos/1");
        req.set_bearer_token(token);
        req
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let refresher = Arc::new(refresher_fn(move |rt: String| {
            let counter = counter.clone();
            async move {
                assert_eq!(rt, "r1");
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(RefreshedTokens {
                    access_token: Some("a2".into()),
                    refresh_token: Some("r2".into()),
                })
            }
        }));
        let auth = coordinator(refresher, Arc::new(MemoryNavigator::new("/app")));
        auth.sign_in(session("a1", "r1"));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let auth = auth.clone();
            handles.push(tokio::spawn(async move {
                auth.on_error(&sent_with("a1"), ApiError::new("expired", 401))
                    .await
            }));
        }

        for h in handles {
            match h.await.unwrap() {
                ResponseAction::Replay(req) => {
                    assert_eq!(req.bearer_token(), Some("a2"));
                    assert!(req.retried);
                }
                ResponseAction::Reject(e) => panic!("unexpected rejection: {e}"),
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(auth.refresh_count(), 1);
        assert!(!auth.is_refreshing());
        assert_eq!(auth.store().refresh_token().as_deref(), Some("r2"));
    }

    fn gated_refresher(gate: Arc<tokio::sync::Notify>) -> Arc<dyn TokenRefresher> {
        Arc::new(refresher_fn(move |_rt: String| {
            let gate = gate.clone();
            async move {
                gate.notified().await;
                Ok(RefreshedTokens {
                    access_token: Some("a2".into()),
                    refresh_token: None,
                })
            }
        }))
    }

    fn queued_paths(auth: &AuthCoordinator) -> Vec<String> {
        match &*auth.inner.state() {
            RefreshState::Refreshing(queue) => queue.iter().map(|w| w.path.clone()).collect(),
            RefreshState::Idle => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_waiters_queue_in_arrival_order() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let auth = coordinator(gated_refresher(gate.clone()), Arc::new(MemoryNavigator::new("/app")));
        auth.sign_in(session("a1", "r1"));

        let mut receivers = Vec::new();
        for i in 0..4 {
            let mut req = RequestParts::new(Method::GET, format!("/todos/{}", i));
            req.set_bearer_token("a1");
            match auth.join(&req) {
                Join::Wait(rx) => receivers.push(rx),
                _ => panic!("request {i} should wait on the refresh"),
            }
        }
        assert_eq!(
            queued_paths(&auth),
            vec!["/todos/0", "/todos/1", "/todos/2", "/todos/3"]
        );
        assert_eq!(auth.refresh_count(), 1);

        gate.notify_one();
        for rx in receivers {
            assert_eq!(rx.await.unwrap().unwrap(), "a2");
        }
        assert!(!auth.is_refreshing());
    }

    #[tokio::test]
    async fn test_dropped_waiter_leaves_refresh_running() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let auth = coordinator(gated_refresher(gate.clone()), Arc::new(MemoryNavigator::new("/app")));
        auth.sign_in(session("a1", "r1"));

        let abandoned = {
            let auth = auth.clone();
            tokio::spawn(async move {
                auth.on_error(&sent_with("a1"), ApiError::new("expired", 401))
                    .await
            })
        };
        let mut stayed = RequestParts::new(Method::GET, "/todos/2");
        stayed.set_bearer_token("a1");
        let waiting = {
            let auth = auth.clone();
            tokio::spawn(async move { auth.on_error(&stayed, ApiError::new("expired", 401)).await })
        };
        while queued_paths(&auth).len() < 2 {
            tokio::task::yield_now().await;
        }

        abandoned.abort();
        assert!(abandoned.await.unwrap_err().is_cancelled());
        assert!(auth.is_refreshing());
        assert_eq!(queued_paths(&auth).len(), 2);

        gate.notify_one();
        match waiting.await.unwrap() {
            ResponseAction::Replay(req) => assert_eq!(req.bearer_token(), Some("a2")),
            ResponseAction::Reject(e) => panic!("unexpected rejection: {e}"),
        }
        assert_eq!(auth.refresh_count(), 1);
        assert!(!auth.is_refreshing());
        assert_eq!(auth.store().access_token().as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn test_failed_refresh_rejects_everyone_and_redirects() {
        let refresher = Arc::new(refresher_fn(|_rt: String| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err(ApiError::new("invalid refresh token", 403))
        }));
        let nav = Arc::new(MemoryNavigator::new("/app/settings"));
        let auth = coordinator(refresher, nav.clone());
        auth.sign_in(session("a1", "r1"));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let auth = auth.clone();
            handles.push(tokio::spawn(async move {
                auth.on_error(&sent_with("a1"), ApiError::new("expired", 401))
                    .await
            }));
        }
        for h in handles {
            match h.await.unwrap() {
                ResponseAction::Reject(e) => assert!(e.is_session_expired()),
                ResponseAction::Replay(_) => panic!("unexpected replay"),
            }
        }
        assert_eq!(auth.refresh_count(), 1);
        assert!(auth.store().credentials().is_none());
        assert_eq!(
            nav.history(),
            vec!["/auth/login?redirectTo=%2Fapp%2Fsettings".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_access_token_counts_as_failure() {
        let refresher = Arc::new(refresher_fn(|_rt: String| async {
            Ok(RefreshedTokens::default())
        }));
        let auth = coordinator(refresher, Arc::new(MemoryNavigator::new("/app")));
        auth.sign_in(session("a1", "r1"));
        match auth.on_error(&sent_with("a1"), ApiError::new("expired", 401)).await {
            ResponseAction::Reject(e) => assert!(e.is_session_expired()),
            ResponseAction::Replay(_) => panic!("unexpected replay"),
        }
        assert!(!auth.store().is_signed_in());
    }

    #[tokio::test]
    async fn test_no_refresh_token_expires_without_refresh_call() {
        let refresher = Arc::new(NeverRefresh);
        let nav = Arc::new(MemoryNavigator::new("/auth/register"));
        let auth = coordinator(refresher, nav.clone());

        match auth.on_error(&RequestParts::new(Method::GET, "/auth/me"), ApiError::new("no", 401)).await {
            ResponseAction::Reject(e) => assert!(e.is_session_expired()),
            ResponseAction::Replay(_) => panic!("unexpected replay"),
        }
        assert_eq!(auth.refresh_count(), 0);
        // Already under the auth prefix.
        assert!(nav.history().is_empty());
    }

    #[tokio::test]
    async fn test_exempt_and_retried_requests_pass_through() {
        let refresher = Arc::new(NeverRefresh);
        let auth = coordinator(refresher, Arc::new(MemoryNavigator::new("/app")));
        auth.sign_in(session("a1", "r1"));

        let login = RequestParts::new(Method::POST, "/auth/login");
        match auth.on_error(&login, ApiError::new("bad credentials", 401)).await {
            ResponseAction::Reject(e) => assert_eq!(e.message(), "bad credentials"),
            ResponseAction::Replay(_) => panic!("login must not be intercepted"),
        }

        let mut retried = sent_with("a1");
        retried.retried = true;
        match auth.on_error(&retried, ApiError::new("still expired", 401)).await {
            ResponseAction::Reject(e) => {
                assert!(e.is_unauthorized());
                assert!(!e.is_session_expired());
            }
            ResponseAction::Replay(_) => panic!("retried request must not loop"),
        }

        match auth.on_error(&sent_with("a1"), ApiError::new("gone", 404)).await {
            ResponseAction::Reject(e) => assert!(e.is_not_found()),
            ResponseAction::Replay(_) => panic!("only 401 is intercepted"),
        }
        assert_eq!(auth.refresh_count(), 0);
        assert!(auth.store().is_signed_in());
    }

    #[tokio::test]
    async fn test_stale_token_replays_without_refresh() {
        let refresher = Arc::new(NeverRefresh);
        let auth = coordinator(refresher, Arc::new(MemoryNavigator::new("/app")));
        auth.sign_in(session("a2", "r2"));

        match auth.on_error(&sent_with("a1"), ApiError::new("expired", 401)).await {
            ResponseAction::Replay(req) => assert_eq!(req.bearer_token(), Some("a2")),
            ResponseAction::Reject(e) => panic!("unexpected rejection: {e}"),
        }
        assert_eq!(auth.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_request_stage_injects_current_token() {
        let refresher = Arc::new(refresher_fn(|_rt: String| async {
            Ok(RefreshedTokens::default())
        }));
        let auth = coordinator(refresher, Arc::new(MemoryNavigator::default()));
        let mut req = RequestParts::new(Method::GET, "/auth/me");
        auth.on_request(&mut req).await;
        assert_eq!(req.bearer_token(), None);

        auth.sign_in(session("a1", "r1"));
        auth.on_request(&mut req).await;
        assert_eq!(req.bearer_token(), Some("a1"));
    }
}
