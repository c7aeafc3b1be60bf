//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//!
//! # Auth (public)
//! GET  /login                       - Login page
//! POST /login                       - Login action (rate limited)
//! GET  /signup                      - Sign-up page
//! POST /signup                      - Sign-up action (rate limited)
//! POST /logout                      - Logout action
//!
//! # Catalog (requires session)
//! GET  /                            - Catalog page (?q=&page=)
//! GET  /catalog/{view}/search       - Results fragment for a search term (HTMX)
//! GET  /catalog/{view}/page/{n}     - Results fragment for a page (HTMX)
//!
//! # Products (requires session unless STOREFRONT_GUARD_PRODUCT_DETAIL=false)
//! GET  /product/{id}                - Product detail page
//! GET  /product/{id}/details        - Product details fragment (HTMX)
//! ```

pub mod auth;
pub mod catalog;
pub mod products;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, require_session};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/signup",
            get(auth::signup_page).merge(post(auth::signup).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/catalog/{view}/search", get(catalog::search))
        .route("/catalog/{view}/page/{page}", get(catalog::page))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/product/{id}", get(products::show))
        .route("/product/{id}/details", get(products::details))
}

/// Create all routes for the storefront.
///
/// `guard_product_detail` puts the product pages behind the identity gate
/// alongside the catalog.
pub fn routes(guard_product_detail: bool) -> Router<AppState> {
    let mut guarded = catalog_routes();
    let mut public = auth_routes();

    if guard_product_detail {
        guarded = guarded.merge(product_routes());
    } else {
        public = public.merge(product_routes());
    }

    Router::new()
        .merge(guarded.route_layer(from_fn(require_session)))
        .merge(public)
}
