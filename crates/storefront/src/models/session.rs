//! Session-related types.
//!
//! The session is the per-client key-value store. It holds exactly two
//! entries: the serialized cart and a one-shot notice.

use serde::{Deserialize, Serialize};

/// A message shown once on the next rendered page, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the serialized cart (a JSON array of lines).
    pub const CART: &str = techstore_core::CART_KEY;

    /// Key for the pending one-shot notice.
    pub const NOTICE: &str = "techstore_notice";
}
