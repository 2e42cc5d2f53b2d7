//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /                       - Product listing (?q=&category=&price=)
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart, redirect to return_to
//! POST /cart/update            - Increment or decrement a line, redirect to /cart
//! POST /cart/remove            - Remove a line, redirect to /cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Placeholder checkout page
//! ```

pub mod cart;
pub mod products;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    CartSessionStore, SESSION_SWEEP_INTERVAL, create_session_layer, error_page_middleware,
    request_id_middleware, security_headers_middleware, spawn_expired_session_sweep,
};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
}

/// Build the complete application with middleware.
///
/// Sessions live in process memory, so carts are lost on restart. Spawns the
/// expired-session sweep, so this must be called from within a Tokio runtime.
pub fn app(state: AppState) -> Router {
    let store = CartSessionStore::default();
    spawn_expired_session_sweep(store.clone(), SESSION_SWEEP_INTERVAL);
    let session_layer = create_session_layer(store, state.config());
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", static_files)
        .layer(axum_middleware::from_fn(error_page_middleware))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog.
async fn health() -> &'static str {
    "ok"
}
