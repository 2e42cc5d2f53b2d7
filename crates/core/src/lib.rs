//! TechStore Core - Shared domain library.
//!
//! This crate provides the domain types and logic used by the storefront:
//! product catalog filtering and shopping cart reconciliation.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no session
//! access, no HTTP clients. Everything here is synchronous and operates on
//! small in-memory lists.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices
//! - [`catalog`] - Catalog products and the listing filter
//! - [`cart`] - The persisted shopping cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{CART_KEY, Cart, CartError, CartItem, CartLine};
pub use catalog::{PriceBand, Product, ProductFilter, Rating};
pub use types::*;
