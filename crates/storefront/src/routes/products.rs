//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use techstore_core::catalog::{categories, category_label, truncate_title};
use techstore_core::{PriceBand, Product, ProductFilter, ProductId};
use tracing::instrument;

use crate::catalog::CatalogError;
use crate::filters;
use crate::middleware::PageChrome;
use crate::state::AppState;

/// Longest title shown on a listing card before truncation.
const CARD_TITLE_MAX_CHARS: usize = 50;

/// Product card data for the listing.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: ProductId,
    pub title: String,
    pub full_title: String,
    pub price: String,
    pub image: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: truncate_title(&product.title, CARD_TITLE_MAX_CHARS),
            full_title: product.title.clone(),
            price: product.display_price().to_string(),
            image: product.image.clone(),
        }
    }
}

/// Product detail data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: Option<RatingView>,
}

/// Rating display data.
#[derive(Clone)]
pub struct RatingView {
    pub rate: String,
    pub count: u32,
}

impl From<Product> for ProductDetailView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            price: product.display_price().to_string(),
            category: category_label(&product.category),
            rating: product.rating.map(|r| RatingView {
                rate: format!("{:.1}", r.rate),
                count: r.count,
            }),
            title: product.title,
            description: product.description,
            image: product.image,
        }
    }
}

/// A `<select>` option.
#[derive(Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
}

impl ListingQuery {
    /// Translate the query string into a catalog filter.
    #[must_use]
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.q.clone(),
            category: self.category.clone(),
            price: self
                .price
                .as_deref()
                .map_or_else(PriceBand::default, PriceBand::parse_lenient),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductCardView>,
    pub search: String,
    pub category_options: Vec<SelectOption>,
    pub price_options: Vec<SelectOption>,
    pub return_to: String,
    pub error: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: PageChrome,
    pub product: Option<ProductDetailView>,
    pub error: Option<String>,
}

fn category_options(products: &[Product], filter: &ProductFilter) -> Vec<SelectOption> {
    let active = filter.active_category();
    let mut options = vec![SelectOption {
        value: "all".to_string(),
        label: "All categories".to_string(),
        selected: active.is_none(),
    }];
    options.extend(categories(products).into_iter().map(|category| SelectOption {
        label: category_label(&category),
        selected: active == Some(category.as_str()),
        value: category,
    }));
    options
}

fn price_options(filter: &ProductFilter) -> Vec<SelectOption> {
    PriceBand::ALL
        .iter()
        .map(|band| SelectOption {
            value: band.as_str().to_string(),
            label: band.label().to_string(),
            selected: *band == filter.price,
        })
        .collect()
}

/// Display product listing page.
///
/// Fetches the whole catalog, then narrows it by search, category and price.
#[instrument(skip(state, chrome, uri))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
    OriginalUri(uri): OriginalUri,
    chrome: PageChrome,
) -> Response {
    let filter = query.to_filter();
    let return_to = uri
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);
    let search = query.q.clone().unwrap_or_default();

    match state.catalog().list_products().await {
        Ok(products) => {
            let cards = filter
                .apply(&products)
                .into_iter()
                .map(ProductCardView::from)
                .collect();

            ProductsIndexTemplate {
                chrome,
                products: cards,
                search,
                category_options: category_options(&products, &filter),
                price_options: price_options(&filter),
                return_to,
                error: None,
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch catalog: {e}");
            (
                StatusCode::BAD_GATEWAY,
                ProductsIndexTemplate {
                    chrome,
                    products: Vec::new(),
                    search,
                    category_options: category_options(&[], &filter),
                    price_options: price_options(&filter),
                    return_to,
                    error: Some("Failed to load products.".to_string()),
                },
            )
                .into_response()
        }
    }
}

/// Display product detail page.
#[instrument(skip(state, chrome))]
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    chrome: PageChrome,
) -> Response {
    let error_page = |status: StatusCode, chrome: PageChrome, message: &str| {
        (
            status,
            ProductShowTemplate {
                chrome,
                product: None,
                error: Some(message.to_string()),
            },
        )
            .into_response()
    };

    let Ok(id) = raw_id.parse::<ProductId>() else {
        return error_page(StatusCode::BAD_REQUEST, chrome, "Product ID missing.");
    };

    match state.catalog().get_product(id).await {
        Ok(product) => ProductShowTemplate {
            chrome,
            product: Some(ProductDetailView::from(product)),
            error: None,
        }
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to load product {id}: {e}");
            let status = match e {
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            };
            error_page(status, chrome, "Failed to load product.")
        }
    }
}
