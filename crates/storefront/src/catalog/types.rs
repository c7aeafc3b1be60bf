//! Catalog API response types.

use serde::{Deserialize, Serialize};

use shopfront_core::{Price, ProductId};

/// A product as returned by the catalog API.
///
/// Only `id`, `title` and `price` are required; everything else degrades to
/// empty values so one sparse record cannot fail a whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Image to show on cards: the thumbnail, else the first gallery image.
    #[must_use]
    pub fn card_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}

/// Envelope of the listing and search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub skip: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}
