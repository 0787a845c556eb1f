//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::StorefrontConfig;
use crate::middleware::session::SESSION_IDLE_SECONDS;
use crate::platform::{PlatformClient, PlatformError};
use crate::services::VisitorRegistry;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    platform: PlatformClient,
    visitors: VisitorRegistry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, PlatformError> {
        let platform = PlatformClient::new(&config.platform)?;
        let visitors = VisitorRegistry::new(Duration::from_secs(
            SESSION_IDLE_SECONDS.unsigned_abs(),
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                platform,
                visitors,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the platform API client.
    #[must_use]
    pub fn platform(&self) -> &PlatformClient {
        &self.inner.platform
    }

    /// Get a reference to the visitor context registry.
    #[must_use]
    pub fn visitors(&self) -> &VisitorRegistry {
        &self.inner.visitors
    }
}
