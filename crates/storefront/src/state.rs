//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogClient};
use crate::config::StorefrontConfig;
use crate::controller::CatalogViews;
use crate::identity::{FirebaseIdentity, IdentityProvider};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog and identity clients, live catalog views and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn Catalog>,
    identity: Arc<dyn IdentityProvider>,
    views: CatalogViews,
}

impl AppState {
    /// Create application state backed by the configured HTTP services.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let catalog = Arc::new(CatalogClient::new(&config.catalog));
        let identity = Arc::new(FirebaseIdentity::new(&config.identity));
        Self::with_services(config, catalog, identity)
    }

    /// Create application state over explicit service implementations.
    #[must_use]
    pub fn with_services(
        config: StorefrontConfig,
        catalog: Arc<dyn Catalog>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let views = CatalogViews::new(Arc::clone(&catalog), config.catalog.settings());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                identity,
                views,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> Arc<dyn Catalog> {
        Arc::clone(&self.inner.catalog)
    }

    /// Get the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Get the registry of live catalog views.
    #[must_use]
    pub fn views(&self) -> &CatalogViews {
        &self.inner.views
    }
}
