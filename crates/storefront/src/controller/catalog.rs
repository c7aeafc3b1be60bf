//! Catalog view-state controller: search, debounce, pagination.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use shopfront_core::{Pagination, ProductId};

use crate::catalog::{Catalog, Product};

/// Default delay between the last keystroke and the search request.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(6) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

/// Tunables for a catalog controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Products per page.
    pub page_size: NonZeroUsize,
    /// Quiet period after the last search edit before fetching.
    pub search_debounce: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

/// Everything the catalog page renders from.
#[derive(Debug, Clone)]
pub struct ViewState {
    search_term: String,
    current_page: usize,
    products: Arc<[Product]>,
    page_size: NonZeroUsize,
    issued: u64,
    settled: u64,
}

impl ViewState {
    fn new(page_size: NonZeroUsize) -> Self {
        Self {
            search_term: String::new(),
            current_page: 1,
            products: Arc::from(Vec::new()),
            page_size,
            issued: 0,
            settled: 0,
        }
    }

    /// The search box contents.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// The selected page, 1-based.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// All products of the last applied fetch.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Pagination over [`products`](Self::products).
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.products.len(), self.page_size)
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pagination().page_count()
    }

    /// The products on the current page.
    #[must_use]
    pub fn visible(&self) -> &[Product] {
        self.pagination().slice(&self.products, self.current_page)
    }

    /// Generation of the last applied fetch intent (0 before any).
    #[must_use]
    pub const fn settled_generation(&self) -> u64 {
        self.settled
    }
}

/// Outcome of waiting on a fetch intent.
#[derive(Debug, Clone)]
pub enum Settled {
    /// The intent was the latest; this is the state it produced.
    Applied(ViewState),
    /// A newer intent replaced it before it completed.
    Superseded,
}

/// Where a catalog action sends the user next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Detail page of a product.
    Product(ProductId),
    /// Login page.
    Login,
}

impl Navigation {
    /// Route path of the destination.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Product(id) => format!("/product/{id}"),
            Self::Login => "/login".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FetchIntent {
    ListAll,
    Search(String),
}

impl FetchIntent {
    fn for_term(term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            Self::ListAll
        } else {
            Self::Search(term.to_string())
        }
    }
}

/// Owns one catalog page's view state.
///
/// Cheap to clone; clones drive the same state.
#[derive(Clone)]
pub struct CatalogController {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<dyn Catalog>,
    settings: CatalogSettings,
    state: watch::Sender<ViewState>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl CatalogController {
    /// Create a controller with empty state. Call [`mount`](Self::mount) to
    /// load products.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, settings: CatalogSettings) -> Self {
        let (state, _) = watch::channel(ViewState::new(settings.page_size));
        Self {
            inner: Arc::new(Inner {
                catalog,
                settings,
                state,
                pending: Mutex::new(None),
            }),
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.inner.state.borrow().clone()
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.inner.state.subscribe()
    }

    /// Load the full listing. Returns the intent's generation.
    pub fn mount(&self) -> u64 {
        self.mount_with("")
    }

    /// Load the page for an already-settled search term, without debouncing.
    ///
    /// Used when the catalog page is opened with a submitted query.
    pub fn mount_with(&self, term: &str) -> u64 {
        let generation = self.issue(term);
        let inner = Arc::clone(&self.inner);
        let intent = FetchIntent::for_term(term);
        self.replace_pending(tokio::spawn(async move {
            inner.fetch(generation, intent).await;
        }));
        generation
    }

    /// Record a search edit and (re)start the debounce timer.
    ///
    /// When the timer fires with no further edits, a non-blank term is
    /// searched and a blank one reloads the full listing. An edit that does
    /// not change the term issues nothing and returns the current generation.
    pub fn set_search_term(&self, term: &str) -> u64 {
        {
            let state = self.inner.state.borrow();
            if state.search_term == term && state.issued > 0 {
                return state.issued;
            }
        }

        let generation = self.issue(term);
        let inner = Arc::clone(&self.inner);
        let intent = FetchIntent::for_term(term);
        self.replace_pending(tokio::spawn(async move {
            tokio::time::sleep(inner.settings.search_debounce).await;
            inner.fetch(generation, intent).await;
        }));
        generation
    }

    /// Select a page, clamped to the available pages. Returns the page set.
    pub fn set_page(&self, page: usize) -> usize {
        let mut selected = 1;
        self.inner.state.send_if_modified(|state| {
            selected = state.pagination().clamp(page);
            let changed = state.current_page != selected;
            state.current_page = selected;
            changed
        });
        selected
    }

    /// Wait until `generation` is applied or superseded.
    pub async fn settled(&self, generation: u64) -> Settled {
        let mut rx = self.inner.state.subscribe();
        match rx.wait_for(|state| state.settled >= generation).await {
            Ok(state) if state.settled == generation => Settled::Applied(state.clone()),
            _ => Settled::Superseded,
        }
    }

    /// Product click: where to go.
    #[must_use]
    pub const fn open_product(&self, id: ProductId) -> Navigation {
        Navigation::Product(id)
    }

    /// Stop any pending debounce timer or in-flight fetch.
    pub fn cancel_pending(&self) {
        if let Some(handle) = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    /// Start a new intent for `term`, returning its generation.
    fn issue(&self, term: &str) -> u64 {
        let mut generation = 0;
        self.inner.state.send_modify(|state| {
            state.issued += 1;
            state.search_term = term.to_string();
            generation = state.issued;
        });
        generation
    }

    fn replace_pending(&self, handle: JoinHandle<()>) {
        let previous = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Inner {
    async fn fetch(&self, generation: u64, intent: FetchIntent) {
        let result = match &intent {
            FetchIntent::ListAll => self.catalog.list_all().await,
            FetchIntent::Search(term) => self.catalog.search(term).await,
        };

        self.state.send_if_modified(|state| {
            if state.issued != generation {
                tracing::debug!(
                    generation,
                    latest = state.issued,
                    "Discarding stale catalog response"
                );
                return false;
            }

            match result {
                Ok(products) => {
                    state.products = Arc::from(products);
                    state.current_page = state.pagination().clamp(state.current_page);
                }
                Err(e) => {
                    tracing::warn!(error = %e, intent = ?intent, "Catalog fetch failed, keeping previous products");
                }
            }
            state.settled = generation;
            true
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
