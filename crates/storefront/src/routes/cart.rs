//! Cart route handlers.
//!
//! The cart lives in the session as one serialized list. Every mutation is a
//! read-modify-write of that list followed by a redirect, so counts and totals
//! are always recomputed from the stored lines.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use techstore_core::catalog::short_title;
use techstore_core::{Cart, CartItem, CartLine, Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_store::{read_cart, set_notice, write_cart};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::PageChrome;
use crate::models::session::Notice;
use crate::state::AppState;

/// Number of title words used in the "added to cart" notice.
const NOTICE_TITLE_WORDS: usize = 4;

/// Message shown by the placeholder checkout.
pub const CHECKOUT_MESSAGE: &str =
    "This is a dummy checkout. Integrate payment gateway to complete.";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub quantity: u32,
    pub line_price: String,
    pub image: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id,
            title: line.title.clone(),
            price: Price::usd(line.price).to_string(),
            quantity: line.quantity,
            line_price: Price::usd(line.line_total()).to_string(),
            image: line.image.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            total: cart.total_price().to_string(),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    /// Local path to land on afterwards.
    pub return_to: Option<String>,
}

/// Quantity change requested from the cart page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityAction {
    Inc,
    Dec,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub action: QuantityAction,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: PageChrome,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Placeholder checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/checkout.html")]
pub struct CheckoutTemplate {
    pub chrome: PageChrome,
    pub cart: CartView,
    pub message: &'static str,
}

/// Only same-site paths that form a valid `Location` header are accepted as
/// redirect targets.
fn safe_return_to(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/cart",
    }
}

/// Display cart page.
#[instrument(skip(session, chrome))]
pub async fn show(session: Session, chrome: PageChrome) -> Result<impl IntoResponse> {
    let cart = read_cart(&session).await?;

    Ok(CartShowTemplate {
        chrome,
        cart: CartView::from(&cart),
    })
}

/// Add a product to the cart.
///
/// The product is fetched from the catalog so the stored line carries the
/// catalog's title, price and image. Adding a product already in the cart
/// bumps its quantity.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let product = state.catalog().get_product(form.product_id).await?;

    let mut cart = read_cart(&session).await?;
    let quantity = cart.add(CartItem::from(&product)).quantity;
    write_cart(&session, &cart).await?;

    let message = format!(
        "{} added to cart",
        short_title(&product.title, NOTICE_TITLE_WORDS)
    );
    set_notice(&session, Notice::new(message)).await?;

    let product_id = product.id.to_string();
    let quantity = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added product",
        Some(&[("product_id", &product_id), ("quantity", &quantity)]),
    );

    Ok(Redirect::to(safe_return_to(form.return_to.as_deref())))
}

/// Change a line's quantity by one unit.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    let mut cart = read_cart(&session).await?;

    let result = match form.action {
        QuantityAction::Inc => cart.increment(form.product_id),
        QuantityAction::Dec => cart.decrement(form.product_id),
    };

    match result {
        Ok(quantity) => {
            write_cart(&session, &cart).await?;
            tracing::debug!(product_id = %form.product_id, quantity, "Cart line updated");
        }
        Err(e) => tracing::warn!("Ignoring cart update: {e}"),
    }

    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut cart = read_cart(&session).await?;

    if cart.remove(form.product_id).is_some() {
        write_cart(&session, &cart).await?;
    } else {
        tracing::warn!(product_id = %form.product_id, "Ignoring removal of absent cart line");
    }

    Ok(Redirect::to("/cart"))
}

/// Get cart count badge fragment.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<CartCountTemplate> {
    let cart = read_cart(&session).await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

/// Placeholder checkout. Leaves the cart untouched.
#[instrument(skip(session, chrome))]
pub async fn checkout(session: Session, chrome: PageChrome) -> Result<impl IntoResponse> {
    let cart = read_cart(&session).await?;
    add_breadcrumb("cart", "Dummy checkout", None);

    Ok(CheckoutTemplate {
        chrome,
        cart: CartView::from(&cart),
        message: CHECKOUT_MESSAGE,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_safe_return_to() {
        assert_eq!(safe_return_to(Some("/?q=shirt&price=low")), "/?q=shirt&price=low");
        assert_eq!(safe_return_to(Some("/products/3")), "/products/3");
        assert_eq!(safe_return_to(Some("//evil.example")), "/cart");
        assert_eq!(safe_return_to(Some("https://evil.example")), "/cart");
        assert_eq!(safe_return_to(Some("/\\evil.example")), "/cart");
        assert_eq!(safe_return_to(Some("/a\r\nb")), "/cart");
        assert_eq!(safe_return_to(Some("/products\t1")), "/cart");
        assert_eq!(safe_return_to(Some("/\u{7f}")), "/cart");
        assert_eq!(safe_return_to(None), "/cart");
    }

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        let item = CartItem {
            id: ProductId::new(1),
            title: "Backpack".to_string(),
            price: Decimal::new(10995, 2),
            image: String::new(),
        };
        cart.add(item.clone());
        cart.add(item);

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.total, "$219.90");
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].price, "$109.95");
        assert_eq!(view.items[0].line_price, "$219.90");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert!(view.items.is_empty());
        assert_eq!(view.total, "$0.00");
    }
}
