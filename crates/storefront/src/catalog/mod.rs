//! Product catalog API client.
//!
//! # Architecture
//!
//! - The external catalog (DummyJSON) is the source of truth - no local copy
//! - Plain JSON over HTTPS with `reqwest`, no retries, client-default timeouts
//! - [`Catalog`] is the seam the controllers depend on, so tests can swap in
//!   an in-memory catalog
//!
//! # Endpoints
//!
//! ```text
//! GET /products               -> { "products": [Product] }
//! GET /products/search?q=term -> { "products": [Product] }
//! GET /products/{id}          -> Product
//! ```

mod client;
pub mod types;

pub use client::CatalogClient;
pub use types::{Product, ProductList};

use async_trait::async_trait;
use thiserror::Error;

use shopfront_core::ProductId;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API answered with a non-success status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read-only access to the product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the default product listing.
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError>;

    /// Fetch products matching a search term.
    async fn search(&self, term: &str) -> Result<Vec<Product>, CatalogError>;

    /// Fetch a single product.
    async fn get_by_id(&self, id: ProductId) -> Result<Product, CatalogError>;
}
