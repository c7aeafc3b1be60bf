//! Registry of live catalog page views.
//!
//! Each catalog page visit gets its own controller, addressed by a view id
//! embedded in the page. HTMX fragment requests find their controller here.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use super::catalog::{CatalogController, CatalogSettings};
use crate::catalog::Catalog;

/// Views idle longer than this are dropped (their pending work is aborted).
const VIEW_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on concurrently tracked views.
const MAX_VIEWS: u64 = 10_000;

/// Catalog controllers keyed by view id.
#[derive(Clone)]
pub struct CatalogViews {
    catalog: Arc<dyn Catalog>,
    settings: CatalogSettings,
    views: Cache<Uuid, CatalogController>,
}

impl CatalogViews {
    /// Create an empty registry.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, settings: CatalogSettings) -> Self {
        let views = Cache::builder()
            .max_capacity(MAX_VIEWS)
            .time_to_idle(VIEW_IDLE_TTL)
            .eviction_listener(|id, controller: CatalogController, cause| {
                tracing::debug!(view = %id, ?cause, "Closing catalog view");
                controller.cancel_pending();
            })
            .build();
        Self {
            catalog,
            settings,
            views,
        }
    }

    /// Settings new controllers are created with.
    #[must_use]
    pub const fn settings(&self) -> CatalogSettings {
        self.settings
    }

    /// Register a fresh controller under a new view id.
    pub async fn open(&self) -> (Uuid, CatalogController) {
        let id = Uuid::new_v4();
        let controller = CatalogController::new(Arc::clone(&self.catalog), self.settings);
        self.views.insert(id, controller.clone()).await;
        tracing::debug!(view = %id, "Opened catalog view");
        (id, controller)
    }

    /// Look up a view, creating and mounting a replacement under the same id
    /// if it expired. The flag is `true` when the controller is new.
    pub async fn get_or_open(&self, id: Uuid) -> (CatalogController, bool) {
        if let Some(controller) = self.views.get(&id).await {
            return (controller, false);
        }
        tracing::debug!(view = %id, "Catalog view expired, reopening");
        let controller = CatalogController::new(Arc::clone(&self.catalog), self.settings);
        self.views.insert(id, controller.clone()).await;
        (controller, true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use shopfront_core::ProductId;

    use super::*;
    use crate::catalog::{CatalogError, Product};

    struct EmptyCatalog;

    #[async_trait]
    impl Catalog for EmptyCatalog {
        async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
            Ok(Vec::new())
        }

        async fn search(&self, _term: &str) -> Result<Vec<Product>, CatalogError> {
            Ok(Vec::new())
        }

        async fn get_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
            Err(CatalogError::NotFound(id.to_string()))
        }
    }

    fn views() -> CatalogViews {
        CatalogViews::new(Arc::new(EmptyCatalog), CatalogSettings::default())
    }

    #[tokio::test]
    async fn test_open_registers_view() {
        let views = views();
        let (id, controller) = views.open().await;
        controller.set_search_term("lamp");

        let (found, created) = views.get_or_open(id).await;
        assert!(!created);
        assert_eq!(found.snapshot().search_term(), "lamp");
    }

    #[tokio::test]
    async fn test_views_are_independent() {
        let views = views();
        let (_, first) = views.open().await;
        let (_, second) = views.open().await;
        first.set_search_term("lamp");

        assert_eq!(second.snapshot().search_term(), "");
    }

    #[tokio::test]
    async fn test_get_or_open_recreates_missing_view() {
        let views = views();
        let id = Uuid::new_v4();

        let (_, created) = views.get_or_open(id).await;
        assert!(created);
        let (_, created) = views.get_or_open(id).await;
        assert!(!created);
    }
}
