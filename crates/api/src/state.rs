//! Shared application state.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::services::auth::TokenService;
use crate::store::DocumentStore;

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn DocumentStore>,
    tokens: TokenService,
}

/// Cheap-to-clone handle shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn DocumentStore>) -> Self {
        let tokens = TokenService::new(&config.token_secret, config.token_ttl_secs);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
