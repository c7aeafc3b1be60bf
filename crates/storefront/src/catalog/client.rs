//! DummyJSON catalog client implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::ProductId;

use super::{Catalog, CatalogError, Product, ProductList};
use crate::config::CatalogConfig;

/// Maximum number of body characters kept in logs and errors.
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for the external product catalog API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.base_url.clone())
    }

    /// Create a client from an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, mut base_url: Url) -> Self {
        // Url::join replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            inner: Arc::new(CatalogClientInner { client, base_url }),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn list_url(&self) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join("products")?)
    }

    fn search_url(&self, term: &str) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.join("products/search")?;
        url.query_pairs_mut().append_pair("q", term);
        Ok(url)
    }

    fn product_url(&self, id: ProductId) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(&format!("products/{id}"))?)
    }

    /// GET a URL and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %excerpt(&body),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %excerpt(&body),
                "Invalid catalog API response"
            );
            CatalogError::Parse(e)
        })
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        let list: ProductList = self.get_json(self.list_url()?).await?;
        debug!(count = list.products.len(), total = ?list.total, "Fetched product listing");
        Ok(list.products)
    }

    #[instrument(skip(self))]
    async fn search(&self, term: &str) -> Result<Vec<Product>, CatalogError> {
        let list: ProductList = self.get_json(self.search_url(term)?).await?;
        debug!(count = list.products.len(), "Fetched search results");
        Ok(list.products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get_json(self.product_url(id)?).await
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::json;

    use super::*;

    async fn list_handler() -> Json<serde_json::Value> {
        Json(json!({
            "products": [
                { "id": 1, "title": "Desk Lamp", "price": 24.5, "category": "lighting" },
                { "id": 2, "title": "Sofa", "price": 499, "category": "furniture" },
            ],
            "total": 2,
            "skip": 0,
            "limit": 30,
        }))
    }

    async fn search_handler(Query(query): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
        let term = query.get("q").cloned().unwrap_or_default();
        Json(json!({
            "products": [{ "id": 9, "title": format!("Found {term}"), "price": 1 }],
        }))
    }

    async fn product_handler(Path(id): Path<u32>) -> Response {
        match id {
            1 => Json(json!({ "id": 1, "title": "Desk Lamp", "price": 24.5 })).into_response(),
            500 => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
            7 => "<html>not json</html>".into_response(),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("Product with id '{id}' not found") })),
            )
                .into_response(),
        }
    }

    async fn envelope_without_products() -> Json<serde_json::Value> {
        Json(json!({ "items": [], "total": 0 }))
    }

    /// Serve a fake catalog API on a local port and return its base URL.
    async fn serve_catalog() -> String {
        let router = Router::new()
            .route("/products", get(list_handler))
            .route("/products/search", get(search_handler))
            .route("/products/{id}", get(product_handler))
            .route("/broken/products", get(envelope_without_products));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: &str) -> CatalogClient {
        CatalogClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoint_urls() {
        let client = client("https://dummyjson.com");
        assert_eq!(client.list_url().unwrap().as_str(), "https://dummyjson.com/products");
        assert_eq!(
            client.product_url(ProductId::new(42)).unwrap().as_str(),
            "https://dummyjson.com/products/42"
        );
    }

    #[test]
    fn test_search_term_is_url_encoded() {
        let client = client("https://dummyjson.com");
        assert_eq!(
            client.search_url("red & blue").unwrap().as_str(),
            "https://dummyjson.com/products/search?q=red+%26+blue"
        );
    }

    #[test]
    fn test_base_path_is_preserved() {
        let client = client("http://localhost:8080/api");
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/");
        assert_eq!(
            client.list_url().unwrap().as_str(),
            "http://localhost:8080/api/products"
        );
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(1000);
        assert_eq!(excerpt(&long).len(), BODY_EXCERPT_CHARS);
        assert_eq!(excerpt("short"), "short");
    }

    #[tokio::test]
    async fn test_list_all_over_http() {
        let base = serve_catalog().await;
        let products = client(&base).list_all().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "Desk Lamp");
        assert_eq!(products[1].price.to_string(), "$499.00");
    }

    #[tokio::test]
    async fn test_search_sends_term() {
        let base = serve_catalog().await;
        let products = client(&base).search("red lamp").await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Found red lamp");
    }

    #[tokio::test]
    async fn test_get_by_id_over_http() {
        let base = serve_catalog().await;
        let product = client(&base).get_by_id(ProductId::new(1)).await.unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price.to_string(), "$24.50");
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let base = serve_catalog().await;
        let err = client(&base).get_by_id(ProductId::new(404)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(ref path) if path == "/products/404"));
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let base = serve_catalog().await;
        let err = client(&base).get_by_id(ProductId::new(500)).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Status { status: 500, ref body } if body == "upstream exploded"
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let base = serve_catalog().await;
        let err = client(&base).get_by_id(ProductId::new(7)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn test_listing_without_products_is_parse_error() {
        let base = serve_catalog().await;
        let err = client(&format!("{base}/broken"))
            .list_all()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        let err = client("http://127.0.0.1:1").list_all().await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
