//! TechStore storefront library.
//!
//! Server-rendered product listing, product detail and a session-backed cart
//! over a remote catalog API. The binary in `main.rs` wires this into a
//! listener; integration tests drive [`routes::app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use routes::app;
