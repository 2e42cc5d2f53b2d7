//! Handler errors.
//!
//! Handlers return [`Result`]. Failures become a rendered error page; server
//! side failures are also reported to Sentry.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cart_store::SessionError;
use crate::catalog::CatalogError;
use crate::filters;
use crate::middleware::PageChrome;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show a visitor. Upstream and store details stay in logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) => "Product not found.".to_string(),
            Self::Catalog(_) => "The product catalog is unavailable. Please try again.".to_string(),
            Self::Session(_) | Self::Internal(_) => "Something went wrong.".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(reason) => reason.clone(),
        }
    }
}

/// Marker left on `AppError` responses so the page can be re-rendered with
/// session data.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub message: String,
}

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub chrome: PageChrome,
    pub status: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
        } else {
            tracing::info!(error = %self, "Request rejected");
        }

        let message = self.public_message();
        let page = ErrorTemplate {
            chrome: PageChrome::default(),
            status: status.as_u16(),
            message: message.clone(),
        };

        // Re-rendered with the visitor's chrome by `error_page_middleware`
        let mut response = (status, page).into_response();
        response.extensions_mut().insert(ErrorPage { message });
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record a user action as a Sentry breadcrumb.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let data = data
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(*value)))
        .collect();

    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        data,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use techstore_core::ProductId;

    use super::*;

    fn upstream_down() -> AppError {
        AppError::Catalog(CatalogError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "secret upstream detail".to_string(),
        })
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::NotFound("page".to_string()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (AppError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Catalog(CatalogError::NotFound(ProductId::new(1))),
                StatusCode::NOT_FOUND,
            ),
            (upstream_down(), StatusCode::BAD_GATEWAY),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_public_message_hides_internals() {
        let err = upstream_down();
        assert!(err.to_string().contains("secret upstream detail"));
        assert!(!err.public_message().contains("secret"));

        let err = AppError::Internal("db password wrong".to_string());
        assert_eq!(err.public_message(), "Something went wrong.");
    }

    #[test]
    fn test_client_errors_keep_their_reason() {
        let err = AppError::BadRequest("Product ID missing.".to_string());
        assert_eq!(err.public_message(), "Product ID missing.");
    }
}
