//! Catalog page and its HTMX fragments.
//!
//! A full page load opens a fresh catalog view; the page embeds the view id
//! and every search keystroke or page click is answered by that view's
//! controller. Search debouncing happens server-side, so the search box fires
//! on every input and superseded keystrokes get `204 No Content`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controller::{CatalogController, Settled, ViewState};
use crate::filters;
use crate::middleware::CurrentUser;
use crate::models::UserProfile;
use crate::state::AppState;

/// Catalog query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
}

/// Search fragment query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Product card display data.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image: Option<String>,
    pub href: String,
}

/// One numbered pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub current: bool,
    pub href: String,
}

/// Everything the results region renders.
#[derive(Debug, Clone)]
pub struct ResultsView {
    pub view_id: Uuid,
    pub search_term: String,
    pub products: Vec<ProductCard>,
    pub total: usize,
    pub current_page: usize,
    pub page_count: usize,
    pub pages: Vec<PageLink>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl ResultsView {
    fn new(view_id: Uuid, controller: &CatalogController, state: &ViewState) -> Self {
        let products = state
            .visible()
            .iter()
            .map(|product| ProductCard {
                title: product.title.clone(),
                description: product.description.clone(),
                price: product.price.to_string(),
                category: product.category.clone(),
                image: product.card_image().map(String::from),
                href: controller.open_product(product.id).path(),
            })
            .collect();

        let current_page = state.current_page();
        let page_count = state.page_count();
        let href = |page: usize| page_href(view_id, state.search_term(), page);

        let pages = (1..=page_count)
            .map(|number| PageLink {
                number,
                current: number == current_page,
                href: href(number),
            })
            .collect();

        Self {
            view_id,
            search_term: state.search_term().to_string(),
            products,
            total: state.products().len(),
            current_page,
            page_count,
            pages,
            prev_href: (current_page > 1).then(|| href(current_page - 1)),
            next_href: (current_page < page_count).then(|| href(current_page + 1)),
        }
    }
}

/// Fragment URL for `page` of a view; carries the term so an expired view
/// can be rebuilt.
fn page_href(view_id: Uuid, term: &str, page: usize) -> String {
    let q: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
    format!("/catalog/{view_id}/page/{page}?q={q}")
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub user: Option<UserProfile>,
    pub results: ResultsView,
}

/// Results region fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/catalog_results.html")]
pub struct CatalogResultsTemplate {
    pub results: ResultsView,
}

/// Wait for an intent and return whatever the view shows afterwards.
async fn settle(controller: &CatalogController, generation: u64) -> ViewState {
    match controller.settled(generation).await {
        Settled::Applied(state) => state,
        Settled::Superseded => controller.snapshot(),
    }
}

/// Display the catalog page.
#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let (view_id, controller) = state.views().open().await;

    let generation = controller.mount_with(query.q.as_deref().unwrap_or_default());
    settle(&controller, generation).await;
    controller.set_page(query.page.unwrap_or(1));

    let snapshot = controller.snapshot();
    CatalogTemplate {
        user,
        results: ResultsView::new(view_id, &controller, &snapshot),
    }
}

/// Search keystroke: debounce, then answer with the results of the settled
/// term, or `204` if a newer keystroke replaced this one.
#[tracing::instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let (controller, _) = state.views().get_or_open(view_id).await;
    tracing::debug!(view = %view_id, q = %query.q, "Catalog search input");

    let generation = controller.set_search_term(&query.q);
    match controller.settled(generation).await {
        Settled::Applied(view) => CatalogResultsTemplate {
            results: ResultsView::new(view_id, &controller, &view),
        }
        .into_response(),
        Settled::Superseded => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Page click: select the page and answer with the results region.
#[tracing::instrument(skip_all)]
pub async fn page(
    State(state): State<AppState>,
    Path((view_id, page)): Path<(Uuid, usize)>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let (controller, created) = state.views().get_or_open(view_id).await;
    tracing::debug!(view = %view_id, page, created, "Catalog page selected");

    if created {
        let generation = controller.mount_with(&query.q);
        settle(&controller, generation).await;
    }

    controller.set_page(page);

    let snapshot = controller.snapshot();
    CatalogResultsTemplate {
        results: ResultsView::new(view_id, &controller, &snapshot),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_href_encodes_term() {
        let view = Uuid::nil();
        assert_eq!(
            page_href(view, "red lamp&co", 2),
            "/catalog/00000000-0000-0000-0000-000000000000/page/2?q=red+lamp%26co"
        );
    }
}
