//! Application state shared across handlers.

use std::sync::Arc;

use crate::bazar::{ApiError, BazarClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the Bazar Pepe API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: BazarClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built from `config`.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = BazarClient::new(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Bazar Pepe API client.
    #[must_use]
    pub fn api(&self) -> &BazarClient {
        &self.inner.api
    }
}
