//! The persisted shopping cart.
//!
//! A cart is an ordered list of line items, unique by product id. It is stored
//! as a single serialized JSON array under [`CART_KEY`]. Counts and totals are
//! never stored; they are recomputed from the lines on demand.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// Storage key the cart blob lives under.
pub const CART_KEY: &str = "techstore_cart";

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No line exists for the given product.
    #[error("no cart line for product {0}")]
    LineNotFound(ProductId),
}

/// What gets added to the cart: the product fields a line keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image: String,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Shopping cart, serialized as a bare JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    fn get_mut(&mut self, id: ProductId) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(CartError::LineNotFound(id))
    }

    /// Merge an item into the cart.
    ///
    /// An existing line for the same id gains one unit; otherwise a new line
    /// with quantity 1 is appended. The stored title, price and image of an
    /// existing line are left as they were.
    #[allow(clippy::indexing_slicing)] // index comes from position() or the push just made
    pub fn add(&mut self, item: CartItem) -> &CartLine {
        let index = if let Some(index) = self.lines.iter().position(|line| line.id == item.id) {
            let line = &mut self.lines[index];
            line.quantity = line.quantity.saturating_add(1);
            index
        } else {
            self.lines.push(CartLine {
                id: item.id,
                title: item.title,
                price: item.price,
                image: item.image,
                quantity: 1,
            });
            self.lines.len() - 1
        };
        &self.lines[index]
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the product is not in the cart.
    pub fn increment(&mut self, id: ProductId) -> Result<u32, CartError> {
        let line = self.get_mut(id)?;
        line.quantity = line.quantity.saturating_add(1);
        Ok(line.quantity)
    }

    /// Remove one unit from an existing line. Quantity never drops below 1;
    /// use [`Cart::remove`] to drop a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the product is not in the cart.
    pub fn decrement(&mut self, id: ProductId) -> Result<u32, CartError> {
        let line = self.get_mut(id)?;
        line.quantity = line.quantity.saturating_sub(1).max(1);
        Ok(line.quantity)
    }

    /// Drop a line entirely, returning it if it existed.
    pub fn remove(&mut self, id: ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| line.id == id)?;
        Some(self.lines.remove(index))
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// [`Cart::total`] as a displayable price.
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::usd(self.total())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, price: Decimal) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price,
            image: format!("https://img.example/{id}.jpg"),
        }
    }

    #[test]
    fn test_add_same_id_twice_accumulates_quantity() {
        let mut cart = Cart::new();
        cart.add(item(1, Decimal::new(1099, 2)));
        let line = cart.add(item(1, Decimal::new(1099, 2)));
        assert_eq!(line.quantity, 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_distinct_ids_appends_in_order() {
        let mut cart = Cart::new();
        cart.add(item(3, Decimal::ONE));
        cart.add(item(1, Decimal::ONE));
        cart.add(item(3, Decimal::ONE));
        let ids: Vec<i32> = cart.lines().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_keeps_original_line_details() {
        let mut cart = Cart::new();
        cart.add(item(1, Decimal::new(10, 0)));
        let mut repriced = item(1, Decimal::new(99, 0));
        repriced.title = "Renamed".to_string();
        cart.add(repriced);
        let line = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(line.price, Decimal::new(10, 0));
        assert_eq!(line.title, "Product 1");
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = Cart::new();
        cart.add(item(1, Decimal::ONE));
        assert_eq!(cart.increment(ProductId::new(1)), Ok(2));
        assert_eq!(cart.increment(ProductId::new(1)), Ok(3));
        assert_eq!(cart.decrement(ProductId::new(1)), Ok(2));
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let mut cart = Cart::new();
        cart.add(item(1, Decimal::ONE));
        assert_eq!(cart.decrement(ProductId::new(1)), Ok(1));
        assert_eq!(cart.decrement(ProductId::new(1)), Ok(1));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_mutating_unknown_line_errors() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.increment(ProductId::new(9)),
            Err(CartError::LineNotFound(ProductId::new(9)))
        );
        assert!(cart.decrement(ProductId::new(9)).is_err());
        assert!(cart.remove(ProductId::new(9)).is_none());
    }

    #[test]
    fn test_remove_drops_only_that_line() {
        let mut cart = Cart::new();
        cart.add(item(1, Decimal::ONE));
        cart.add(item(2, Decimal::ONE));
        let removed = cart.remove(ProductId::new(1)).unwrap();
        assert_eq!(removed.id, ProductId::new(1));
        assert_eq!(cart.len(), 1);
        assert!(cart.get(ProductId::new(2)).is_some());
    }

    #[test]
    fn test_total_follows_mutations() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.total_price().to_string(), "$0.00");

        cart.add(item(1, Decimal::new(10995, 2)));
        cart.add(item(1, Decimal::new(10995, 2)));
        cart.add(item(2, Decimal::new(2230, 2)));
        assert_eq!(cart.total(), Decimal::new(24220, 2));

        cart.decrement(ProductId::new(1)).unwrap();
        assert_eq!(cart.total_price().to_string(), "$132.25");

        cart.remove(ProductId::new(2));
        assert_eq!(cart.total_price().to_string(), "$109.95");
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_serializes_as_bare_array_with_numeric_prices() {
        let mut cart = Cart::new();
        cart.add(item(1, Decimal::new(10995, 2)));
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 1,
                "title": "Product 1",
                "price": 109.95,
                "image": "https://img.example/1.jpg",
                "quantity": 1
            }])
        );
    }

    #[test]
    fn test_deserializes_stored_blob() {
        let cart: Cart = serde_json::from_str(
            r#"[{"id":4,"title":"Mug","price":7.5,"image":"m.jpg","quantity":3}]"#,
        )
        .unwrap();
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Decimal::new(225, 1));
    }

    #[test]
    fn test_cart_item_from_product() {
        let product = Product {
            id: ProductId::new(5),
            title: "Ring".to_string(),
            price: Decimal::new(168, 0),
            description: "Gold".to_string(),
            category: "jewelery".to_string(),
            image: "r.jpg".to_string(),
            rating: None,
        };
        let item = CartItem::from(&product);
        assert_eq!(item.id, product.id);
        assert_eq!(item.price, product.price);
    }
}
