//! Per-page layout context extractor.
//!
//! Every rendered page shows the header cart badge and any pending notice.
//! `PageChrome` pulls both out of the session in one place. Handlers that
//! render pages extract it; error responses get it from
//! [`error_page_middleware`].

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::cart_store::{read_cart, take_notice};
use crate::error::{ErrorPage, ErrorTemplate};

/// Layout data shared by every full page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageChrome {
    /// Sum of quantities in the cart.
    pub cart_count: u32,
    /// One-shot notice queued by the previous request.
    pub notice: Option<String>,
}

impl PageChrome {
    /// Read the badge count and take the pending notice.
    ///
    /// A failing store degrades to an empty badge and no notice.
    pub async fn from_session(session: &Session) -> Self {
        let cart_count = match read_cart(session).await {
            Ok(cart) => cart.item_count(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cart for page chrome");
                0
            }
        };

        let notice = match take_notice(session).await {
            Ok(notice) => notice.map(|n| n.message),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read notice for page chrome");
                None
            }
        };

        Self { cart_count, notice }
    }
}

/// Extractor for [`PageChrome`].
///
/// Never rejects: a missing session degrades to an empty badge and no notice.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(chrome: PageChrome) -> impl IntoResponse {
///     MyTemplate { chrome, /* ... */ }
/// }
/// ```
impl<S> FromRequestParts<S> for PageChrome
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            tracing::warn!("Session not found in request extensions - layer may be misconfigured");
            return Ok(Self::default());
        };

        Ok(Self::from_session(session).await)
    }
}

/// Re-render `AppError` pages with the visitor's real cart badge and notice.
///
/// `AppError` responses carry an [`ErrorPage`] extension because the error
/// itself has no access to the session. Must run inside the session layer.
pub async fn error_page_middleware(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let response = next.run(request).await;

    let (Some(session), Some(page)) = (session, response.extensions().get::<ErrorPage>()) else {
        return response;
    };

    let status = response.status();
    let template = ErrorTemplate {
        chrome: PageChrome::from_session(&session).await,
        status: status.as_u16(),
        message: page.message.clone(),
    };
    (status, template).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use rust_decimal::Decimal;
    use techstore_core::{Cart, CartItem, ProductId};
    use tower::ServiceExt;
    use tower_sessions::SessionManagerLayer;

    use super::*;
    use crate::cart_store::{set_notice, write_cart};
    use crate::error::AppError;
    use crate::middleware::session::CartSessionStore;
    use crate::models::session::Notice;

    async fn fill_cart_then_fail(session: Session) -> Result<(), AppError> {
        let mut cart = Cart::new();
        let item = CartItem {
            id: ProductId::new(2),
            title: "Shirt".to_string(),
            price: Decimal::new(2230, 2),
            image: String::new(),
        };
        cart.add(item.clone());
        cart.add(item);
        write_cart(&session, &cart).await?;
        set_notice(&session, Notice::new("Shirt added to cart")).await?;

        Err(AppError::NotFound("product 404".to_string()))
    }

    fn app() -> Router {
        Router::new()
            .route("/fail", get(fill_cart_then_fail))
            .route("/plain", get(|| async { "fine" }))
            .layer(middleware::from_fn(error_page_middleware))
            .layer(SessionManagerLayer::new(CartSessionStore::default()))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_error_page_shows_cart_badge_and_notice() {
        let response = app()
            .oneshot(HttpRequest::get("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
        let body = body_text(response).await;
        assert!(body.contains(r#"aria-label="2 items in cart""#));
        assert!(body.contains("Shirt added to cart"));
        assert!(body.contains("Not found: product 404"));
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = app()
            .oneshot(HttpRequest::get("/plain").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(body_text(response).await, "fine");
    }
}
