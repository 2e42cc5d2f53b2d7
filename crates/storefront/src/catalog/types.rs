//! Wire types for the catalog REST API.
//!
//! These mirror the JSON the API returns and are converted into the core
//! domain types at the client boundary.

use rust_decimal::Decimal;
use serde::Deserialize;
use techstore_core::{Product, ProductId, Rating};

/// A product as returned by `GET /products` and `GET /products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiProduct {
    pub id: i32,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Option<ApiRating>,
}

/// Aggregate rating block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApiRating {
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    pub count: u32,
}

impl From<ApiRating> for Rating {
    fn from(rating: ApiRating) -> Self {
        Self {
            rate: rating.rate,
            count: rating.count,
        }
    }
}

impl From<ApiProduct> for Product {
    fn from(product: ApiProduct) -> Self {
        Self {
            id: ProductId::new(product.id),
            title: product.title,
            price: product.price,
            description: product.description,
            category: product.category,
            image: product.image,
            rating: product.rating.map(Rating::from),
        }
    }
}
