//! Session-backed cart persistence.
//!
//! The cart is stored whole under the [`CART_KEY`] session key and rewritten
//! after every mutation. A stored value that no longer deserializes (for
//! example after a field rename) is dropped and replaced by an empty cart.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

use techstore_core::Cart;

use crate::error::AppError;

/// Session key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// A visitor's cart together with the session it is persisted in.
///
/// Use as an extractor; it requires the session layer.
///
/// ```rust,ignore
/// async fn count(cart: CartStore) -> Json<u32> {
///     Json(cart.cart().count())
/// }
/// ```
pub struct CartStore {
    session: Session,
    cart: Cart,
}

impl CartStore {
    /// Hydrate the cart from the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails. A corrupt cart value is
    /// not an error: it is removed and an empty cart returned.
    pub async fn load(session: Session) -> Result<Self, SessionError> {
        let cart = match session.get::<Cart>(CART_KEY).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(SessionError::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable stored cart");
                session.remove_value(CART_KEY).await?;
                Cart::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self { session, cart })
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Apply a mutation and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn update<R>(&mut self, mutate: impl FnOnce(&mut Cart) -> R) -> Result<R, SessionError> {
        let result = mutate(&mut self.cart);
        self.persist().await?;
        Ok(result)
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear(&mut self) -> Result<(), SessionError> {
        self.update(Cart::clear).await
    }

    async fn persist(&self) -> Result<(), SessionError> {
        self.session.insert(CART_KEY, &self.cart).await
    }
}

impl<S> FromRequestParts<S> for CartStore
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        Ok(Self::load(session).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal::Decimal;
    use techstore_core::{CartVariant, Product, ProductCategory, ProductId, ProductSpecs};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn laptop() -> Product {
        Product {
            id: ProductId::new(7),
            name: "ThinkPad X1".to_string(),
            brand: Some("Lenovo".to_string()),
            category: ProductCategory::Laptop,
            price: Decimal::from(1000),
            discount_price: Some(Decimal::from(800)),
            stock: 4,
            is_available: true,
            description: String::new(),
            thumbnail: None,
            pictures: vec![],
            specs: ProductSpecs::default(),
            colors: vec![],
            sizes: vec![],
            rating: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_empty_session_hydrates_empty_cart() {
        let store = CartStore::load(session()).await.unwrap();
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let session = session();
        let mut store = CartStore::load(session.clone()).await.unwrap();
        let added = store
            .update(|cart| cart.add(&laptop(), 2, CartVariant::default()))
            .await
            .unwrap();
        assert!(added);

        let reloaded = CartStore::load(session).await.unwrap();
        assert_eq!(reloaded.cart().count(), 2);
        assert_eq!(reloaded.cart().total(), Decimal::from(1600));
    }

    #[tokio::test]
    async fn test_corrupt_cart_is_discarded() {
        let session = session();
        session
            .insert_value(CART_KEY, serde_json::json!({"not": "a cart"}))
            .await
            .unwrap();

        let store = CartStore::load(session.clone()).await.unwrap();
        assert!(store.cart().is_empty());
        assert!(session.get_value(CART_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_cart() {
        let session = session();
        let mut store = CartStore::load(session.clone()).await.unwrap();
        store
            .update(|cart| cart.add(&laptop(), 1, CartVariant::default()))
            .await
            .unwrap();
        store.clear().await.unwrap();

        let reloaded = CartStore::load(session).await.unwrap();
        assert!(reloaded.cart().is_empty());
    }
}
