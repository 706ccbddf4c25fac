use std::sync::Arc;
use tracing::info;

use super::core::ApiClient;
use crate::api::auth::remote_refresher;
use crate::auth::{
    AuthCoordinator, AuthStore, CredentialStorage, MemoryNavigator, MemoryStorage, Navigator,
    TokenRefresher,
};
use crate::config::ClientConfig;
use crate::interceptors::{AcceptJson, Interceptor, InterceptorPipeline};
use crate::transport::HttpTransport;
use crate::Result;

/// Builder for [`ApiClient`].
///
/// Pipeline order is fixed: `Accept` header first, then any extra
/// interceptors in the order added, then the auth coordinator.
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    base_url: Option<String>,
    storage: Option<Arc<dyn CredentialStorage>>,
    navigator: Option<Arc<dyn Navigator>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            base_url: None,
            storage: None,
            navigator: None,
            refresher: None,
            interceptors: Vec::new(),
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the base URL of the config (primarily for mock servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Where the credential record is persisted. Default: in memory.
    pub fn storage(mut self, storage: Arc<dyn CredentialStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the default `POST /auth/refresh` call.
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Add an interceptor ahead of the auth coordinator.
    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let mut config = self.config.unwrap_or_default();
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        config.validate()?;

        let transport = Arc::new(HttpTransport::new(&config)?);

        let storage: Arc<dyn CredentialStorage> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(MemoryStorage::new()),
        };
        let store = AuthStore::rehydrate(storage, config.storage_key.clone())?;
        let refresher: Arc<dyn TokenRefresher> = match self.refresher {
            Some(refresher) => refresher,
            None => Arc::new(remote_refresher(&config)?),
        };
        let navigator: Arc<dyn Navigator> = match self.navigator {
            Some(navigator) => navigator,
            None => Arc::new(MemoryNavigator::default()),
        };
        let auth = AuthCoordinator::new(store, refresher, navigator, &config);

        let mut pipeline = InterceptorPipeline::new().with(AcceptJson);
        for interceptor in self.interceptors {
            pipeline.push(interceptor);
        }
        pipeline.push(Box::new(auth.clone()));

        info!(
            base_url = transport.base_url(),
            interceptors = ?pipeline.names(),
            signed_in = auth.store().is_signed_in(),
            api_mocking = config.enable_api_mocking,
            "api client ready"
        );

        Ok(ApiClient {
            transport,
            pipeline: Arc::new(pipeline),
            auth,
        })
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
