//! Client for the remote product catalog REST API.
//!
//! # Endpoints
//!
//! - `GET {api_url}` - every product
//! - `GET {api_url}/{id}` - a single product
//!
//! The catalog is the source of truth: responses are never cached, retried or
//! paginated. Each call is a single awaited request bounded by the configured
//! timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use techstore_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let products = client.list_products().await?;
//! let product = client.get_product(ProductId::new(1)).await?;
//! ```

pub mod types;

use std::sync::Arc;

use reqwest::StatusCode;
use techstore_core::{Product, ProductId};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::CatalogConfig;

use types::ApiProduct;

/// How much of an error body is kept for logs and error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Catalog API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The product does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),
}

/// Client for the catalog REST API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    api_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("techstore-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                api_url: config.api_url.clone(),
            }),
        })
    }

    /// The list endpoint this client talks to.
    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.inner.api_url
    }

    /// URL of a single product: the list endpoint with the id appended.
    fn product_url(&self, id: ProductId) -> Url {
        let mut url = self.inner.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }

    /// GET a URL and return the body of a successful response.
    async fn fetch(&self, url: Url) -> Result<String, CatalogError> {
        let response = self
            .inner
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            tracing::error!(
                status = %status,
                body = %body,
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status { status, body });
        }

        Ok(body)
    }

    /// Fetch every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let body = self.fetch(self.inner.api_url.clone()).await?;

        let products: Vec<ApiProduct> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse catalog product list"
            );
            CatalogError::Parse(e)
        })?;

        tracing::debug!(count = products.len(), "Fetched catalog");
        Ok(products.into_iter().map(Product::from).collect())
    }

    /// Fetch a single product.
    ///
    /// The upstream API answers unknown ids with `200` and an empty body, so
    /// an empty or `null` body maps to [`CatalogError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let body = match self.fetch(self.product_url(id)).await {
            Err(CatalogError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => return Err(CatalogError::NotFound(id)),
            other => other?,
        };

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(CatalogError::NotFound(id));
        }

        let product: ApiProduct = serde_json::from_str(trimmed).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %trimmed.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse catalog product"
            );
            CatalogError::Parse(e)
        })?;

        Ok(product.into())
    }
}
