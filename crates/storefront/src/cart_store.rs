//! Session-backed cart persistence.
//!
//! The whole cart is one JSON blob under a single session key. Reads never
//! fail on bad data: a blob that no longer parses is logged and treated as an
//! empty cart, and the next write replaces it.

use techstore_core::Cart;
use tower_sessions::Session;

use crate::models::session::Notice;
use crate::models::session_keys;

/// Session operation error.
pub type SessionError = tower_sessions::session::Error;

/// Load the cart from the session.
///
/// # Errors
///
/// Returns an error only if the session store itself fails.
pub async fn read_cart(session: &Session) -> Result<Cart, SessionError> {
    let Some(raw) = session.get_value(session_keys::CART).await? else {
        return Ok(Cart::new());
    };

    match serde_json::from_value::<Cart>(raw) {
        Ok(cart) => Ok(cart),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed stored cart");
            Ok(Cart::new())
        }
    }
}

/// Replace the stored cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be serialized or stored.
pub async fn write_cart(session: &Session, cart: &Cart) -> Result<(), SessionError> {
    session.insert(session_keys::CART, cart).await?;
    tracing::debug!(
        lines = cart.len(),
        items = cart.item_count(),
        "Cart written"
    );
    Ok(())
}

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_notice(session: &Session, notice: Notice) -> Result<(), SessionError> {
    session.insert(session_keys::NOTICE, notice).await
}

/// Take the pending notice, if any. Taking it clears it.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn take_notice(session: &Session) -> Result<Option<Notice>, SessionError> {
    let raw = session.remove_value(session_keys::NOTICE).await?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}
