//! Backing store for the cart.

use std::future::Future;

use tower_sessions::Session;

use super::{Cart, CartError};
use crate::models::session_keys;

/// A keyed slot that holds one visitor's cart between requests.
pub trait CartStore: Send + Sync {
    /// Read the stored cart. A missing cart is an empty cart.
    fn load_cart(&self) -> impl Future<Output = Result<Cart, CartError>> + Send;

    /// Replace the stored cart.
    fn save_cart(&self, cart: &Cart) -> impl Future<Output = Result<(), CartError>> + Send;
}

impl CartStore for Session {
    async fn load_cart(&self) -> Result<Cart, CartError> {
        match self.get::<Cart>(session_keys::CART).await {
            Ok(cart) => Ok(cart.unwrap_or_default()),
            // An unreadable cart is treated as empty.
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "discarding unreadable cart in session");
                Ok(Cart::default())
            }
            Err(e) => Err(CartError::Session(e)),
        }
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), CartError> {
        self.insert(session_keys::CART, cart).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use boutique_core::ProductId;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_missing_cart_loads_empty() {
        let cart = session().load_cart().await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let session = session();
        let mut cart = Cart::default();
        cart.add(ProductId::new(3), 2);
        cart.add(ProductId::new(1), 1);

        session.save_cart(&cart).await.unwrap();

        let loaded = session.load_cart().await.unwrap();
        assert_eq!(loaded, cart);
    }

    #[tokio::test]
    async fn test_unreadable_cart_loads_empty() {
        let session = session();
        session
            .insert(session_keys::CART, "not a cart")
            .await
            .unwrap();

        let cart = session.load_cart().await.unwrap();
        assert!(cart.is_empty());
    }
}
