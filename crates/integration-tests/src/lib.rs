//! End-to-end test harness for the storefront.
//!
//! Each [`TestStorefront`] runs the real router on an ephemeral port, backed by
//! a wiremock catalog, and talks to it through a cookie-carrying HTTP client so
//! the session (and with it the cart) survives across requests.
//!
//! ```rust,ignore
//! let store = TestStorefront::start().await;
//! store.mount_catalog(&sample_products()).await;
//! let body = store.get_text("/cart").await;
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::{Client, Response, redirect};
use serde_json::{Value, json};
use techstore_storefront::{config::StorefrontConfig, state::AppState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A running storefront wired to a mock catalog.
pub struct TestStorefront {
    /// Mock catalog API.
    pub catalog: MockServer,
    /// Client that follows redirects and keeps the session cookie.
    pub client: Client,
    /// Client that shares nothing and reports redirects as-is.
    pub raw_client: Client,
    base_url: String,
}

impl TestStorefront {
    /// Start a storefront on an ephemeral port.
    pub async fn start() -> Self {
        let catalog = MockServer::start().await;
        let api_url = format!("{}/products", catalog.uri());

        let config = StorefrontConfig::from_lookup(|key| match key {
            "CATALOG_API_URL" => Some(api_url.clone()),
            "CATALOG_TIMEOUT_SECS" => Some("2".to_string()),
            "STOREFRONT_STATIC_DIR" => Some(
                concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static").to_string(),
            ),
            _ => None,
        })
        .expect("Failed to build test config");
        let state = AppState::new(config).expect("Failed to build app state");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, techstore_storefront::app(state))
                .await
                .expect("Test server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");
        let raw_client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            catalog,
            client,
            raw_client,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Serve `products` from the mock list endpoint and each one from its
    /// per-id endpoint.
    pub async fn mount_catalog(&self, products: &Value) {
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products))
            .mount(&self.catalog)
            .await;

        for product in products.as_array().into_iter().flatten() {
            let id = &product["id"];
            Mock::given(method("GET"))
                .and(path(format!("/products/{id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(product))
                .mount(&self.catalog)
                .await;
        }
    }

    /// GET a page with the session client and return its status and body.
    pub async fn get_text(&self, path: &str) -> (u16, String) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed");
        into_text(resp).await
    }

    /// POST a urlencoded form with the session client, following redirects.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> (u16, String) {
        let resp = send_form(&self.client, &self.url(path), fields).await;
        into_text(resp).await
    }

    /// POST a urlencoded form without following redirects.
    pub async fn post_form_raw(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        send_form(&self.raw_client, &self.url(path), fields).await
    }

    /// Add a product to the cart, following the redirect back to the cart.
    pub async fn add_to_cart(&self, product_id: i32) -> (u16, String) {
        self.post_form("/cart/add", &[("product_id", &product_id.to_string())])
            .await
    }
}

async fn send_form(client: &Client, url: &str, fields: &[(&str, &str)]) -> Response {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();

    client
        .post(url)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .expect("POST request failed")
}

async fn into_text(resp: Response) -> (u16, String) {
    let status = resp.status().as_u16();
    let body = resp.text().await.expect("Failed to read response body");
    (status, body)
}

/// A small catalog spanning every price band and several categories.
#[must_use]
pub fn sample_products() -> Value {
    json!([
        {
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
            "price": 109.95,
            "description": "Your perfect pack for everyday use and walks in the forest.",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        },
        {
            "id": 2,
            "title": "Mens Casual Premium Slim Fit T-Shirts",
            "price": 22.3,
            "description": "Slim-fitting style, contrast raglan long sleeve.",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/71-3HjGNDUL._AC_SY879._SX._UX._SY._UY_.jpg",
            "rating": { "rate": 4.1, "count": 259 }
        },
        {
            "id": 5,
            "title": "John Hardy Women's Legends Naga Gold & Silver Dragon Station Chain Bracelet",
            "price": 695,
            "description": "From our Legends Collection, the Naga was inspired by the mythical water dragon.",
            "category": "jewelery",
            "image": "https://fakestoreapi.com/img/71pWzhdJNwL._AC_UL640_QL65_ML3_.jpg",
            "rating": { "rate": 4.6, "count": 400 }
        },
        {
            "id": 9,
            "title": "WD 2TB Elements Portable External Hard Drive - USB 3.0",
            "price": 64,
            "description": "USB 3.0 and USB 2.0 compatibility, fast data transfers.",
            "category": "electronics",
            "image": "https://fakestoreapi.com/img/61IBBVJvSDL._AC_SY879_.jpg",
            "rating": { "rate": 3.3, "count": 203 }
        }
    ])
}
