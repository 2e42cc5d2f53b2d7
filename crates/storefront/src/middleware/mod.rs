//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, framing, caching)
//! 5. Session layer (tower-sessions over `CartSessionStore`)
//! 6. Error pages (re-render `AppError` responses with the session's chrome)
//!
//! `PageChrome` is an extractor rather than a layer: only full pages need it.

pub mod page;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use page::{PageChrome, error_page_middleware};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{
    CartSessionStore, SESSION_SWEEP_INTERVAL, create_session_layer, spawn_expired_session_sweep,
};
