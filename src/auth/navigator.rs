//! Login redirects.

use std::sync::Mutex;
use url::form_urlencoded::byte_serialize;

/// The host application's location and navigation.
pub trait Navigator: Send + Sync {
    /// Current location path, e.g. `/app/settings`.
    fn current_path(&self) -> String;

    /// Full navigation to `href`.
    fn navigate(&self, href: &str);
}

/// `/auth/login?redirectTo=<encoded>`; no query when `redirect_to` is empty.
pub fn login_href(login_route: &str, redirect_to: Option<&str>) -> String {
    match redirect_to.filter(|r| !r.is_empty()) {
        Some(target) => format!(
            "{}?redirectTo={}",
            login_route,
            byte_serialize(target.as_bytes()).collect::<String>()
        ),
        None => login_route.to_string(),
    }
}

/// In-process navigator that records every navigation.
///
/// Suitable for headless hosts and tests; navigating updates the current
/// path.
#[derive(Debug)]
pub struct MemoryNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(start.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn set_current_path(&self, path: impl Into<String>) {
        if let Ok(mut current) = self.current.lock() {
            *current = path.into();
        }
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.current.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn navigate(&self, href: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push(href.to_string());
        }
        let path = href.split('?').next().unwrap_or(href);
        self.set_current_path(path);
    }
}
