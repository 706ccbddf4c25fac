//! Client configuration.
//!
//! Defaults are production-friendly; every knob can be overridden from the
//! environment (`APP_*` variables) or from a YAML file.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub const ENV_API_URL: &str = "APP_API_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "APP_HTTP_TIMEOUT_SECS";
pub const ENV_POOL_MAX_IDLE_PER_HOST: &str = "APP_HTTP_POOL_MAX_IDLE_PER_HOST";
pub const ENV_PROXY_URL: &str = "APP_PROXY_URL";
pub const ENV_AUTH_PATH_PREFIX: &str = "APP_AUTH_PATH_PREFIX";
pub const ENV_ENABLE_API_MOCKING: &str = "APP_ENABLE_API_MOCKING";

/// Everything needed to build an [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
    pub proxy_url: Option<String>,
    /// Locations under this prefix never trigger a login redirect.
    pub auth_path_prefix: String,
    /// Front-end route of the login screen.
    pub login_route: String,
    /// Request URLs containing any of these are never intercepted for refresh.
    pub exempt_endpoints: Vec<String>,
    /// Key the credential record is persisted under.
    pub storage_key: String,
    pub enable_api_mocking: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
            pool_max_idle_per_host: 32,
            pool_idle_timeout_secs: 90,
            proxy_url: None,
            auth_path_prefix: "/auth".to_string(),
            login_route: "/auth/login".to_string(),
            exempt_endpoints: vec!["/auth/login".to_string(), "/auth/refresh".to_string()],
            storage_key: "auth-storage".to_string(),
            enable_api_mocking: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }

    /// Load configuration from `APP_*` environment variables.
    ///
    /// All problems are collected and reported in a single error so a
    /// misconfigured deployment can be fixed in one pass.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        let mut problems = Vec::new();

        match lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            Some(url) => cfg.base_url = url,
            None => problems.push(format!("- {}: required", ENV_API_URL)),
        }

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(v) => cfg.timeout_secs = v,
                Err(_) => problems.push(format!("- {}: expected seconds, got '{}'", ENV_HTTP_TIMEOUT_SECS, raw)),
            }
        }

        if let Some(raw) = lookup(ENV_POOL_MAX_IDLE_PER_HOST) {
            match raw.parse::<usize>() {
                Ok(v) => cfg.pool_max_idle_per_host = v,
                Err(_) => problems.push(format!(
                    "- {}: expected a number, got '{}'",
                    ENV_POOL_MAX_IDLE_PER_HOST, raw
                )),
            }
        }

        if let Some(proxy) = lookup(ENV_PROXY_URL).filter(|v| !v.is_empty()) {
            cfg.proxy_url = Some(proxy);
        }

        if let Some(prefix) = lookup(ENV_AUTH_PATH_PREFIX).filter(|v| !v.is_empty()) {
            cfg.auth_path_prefix = prefix;
        }

        if let Some(raw) = lookup(ENV_ENABLE_API_MOCKING) {
            match raw.as_str() {
                "true" => cfg.enable_api_mocking = true,
                "false" => cfg.enable_api_mocking = false,
                _ => problems.push(format!(
                    "- {}: must be 'true' or 'false', got '{}'",
                    ENV_ENABLE_API_MOCKING, raw
                )),
            }
        }

        if !problems.is_empty() {
            return Err(Error::configuration_with_context(
                format!("invalid environment configuration:\n{}", problems.join("\n")),
                ErrorContext::new().with_source("config_env"),
            ));
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid YAML: {}", e),
                ErrorContext::new().with_source("config_yaml"),
            )
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(path.display().to_string()),
            },
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("base_url '{}' is not a valid URL: {}", self.base_url, e),
                ErrorContext::new().with_field_path("base_url"),
            )
        })?;
        if !self.auth_path_prefix.starts_with('/') {
            return Err(Error::configuration_with_context(
                "auth_path_prefix must start with '/'",
                ErrorContext::new().with_field_path("auth_path_prefix"),
            ));
        }
        Ok(())
    }
}
