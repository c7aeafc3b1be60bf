//! Product detail view controller.

use std::sync::Arc;

use tokio::sync::watch;

use shopfront_core::ProductId;

use crate::catalog::{Catalog, Product};

/// What the detail page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// Waiting for the product. Also the final state when the fetch fails.
    Loading,
    /// The product has arrived.
    Loaded(Box<Product>),
}

#[derive(Debug, Clone)]
struct DetailView {
    generation: u64,
    id: Option<ProductId>,
    state: DetailState,
}

/// Loads one product by route parameter.
///
/// Nothing is cached across controllers; each page visit fetches again.
#[derive(Clone)]
pub struct DetailController {
    catalog: Arc<dyn Catalog>,
    view: Arc<watch::Sender<DetailView>>,
}

impl DetailController {
    /// Create a controller in the `Loading` state.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        let (view, _) = watch::channel(DetailView {
            generation: 0,
            id: None,
            state: DetailState::Loading,
        });
        Self {
            catalog,
            view: Arc::new(view),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DetailState {
        self.view.borrow().state.clone()
    }

    /// Show product `id`: switch to `Loading` if the id changed, fetch it,
    /// and return the resulting state.
    ///
    /// A response for an id the view has since moved away from is dropped.
    /// Fetch failures are logged and leave the view `Loading`.
    pub async fn show(&self, id: ProductId) -> DetailState {
        let mut generation = 0;
        self.view.send_modify(|view| {
            view.generation += 1;
            if view.id != Some(id) {
                view.id = Some(id);
                view.state = DetailState::Loading;
            }
            generation = view.generation;
        });

        match self.catalog.get_by_id(id).await {
            Ok(product) => {
                self.view.send_if_modified(|view| {
                    if view.generation != generation {
                        tracing::debug!(product_id = %id, "Discarding stale product response");
                        return false;
                    }
                    view.state = DetailState::Loaded(Box::new(product));
                    true
                });
            }
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "Error fetching product details");
            }
        }

        self.state()
    }
}
