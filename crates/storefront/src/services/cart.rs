//! Write-through cart container.
//!
//! [`CartStore`] wraps a [`Cart`] and saves it to the visitor's storage after
//! every mutation. Saving is best effort: a storage failure is logged and the
//! in-memory change stands.

use rust_decimal::Decimal;
use tracing::instrument;

use noor_core::{Cart, CartItem, LineKey};

use crate::models::session::keys;
use crate::storage::Storage;

/// A visitor's cart bound to its backing storage.
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
}

impl<S: Storage> CartStore<S> {
    /// Load the persisted cart, starting empty if none is stored or the stored
    /// value is unreadable.
    pub async fn load(storage: S) -> Self {
        let cart = match storage.fetch::<Cart>(keys::CART).await {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load cart, starting empty");
                Cart::new()
            }
        };
        Self { storage, cart }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// Add a line, merging with an existing line of the same product, size
    /// and color.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_item(&mut self, item: CartItem) {
        self.cart.add_item(item);
        self.persist().await;
    }

    /// Returns whether a line was removed.
    pub async fn remove_item(&mut self, product_id: &str, size: &str, color: &str) -> bool {
        let removed = self
            .cart
            .remove_item(LineKey::new(product_id, size, color));
        if removed {
            self.persist().await;
        }
        removed
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// Returns whether a line matched.
    pub async fn update_quantity(
        &mut self,
        product_id: &str,
        size: &str,
        color: &str,
        quantity: u32,
    ) -> bool {
        let updated = self
            .cart
            .update_quantity(LineKey::new(product_id, size, color), quantity);
        if updated {
            self.persist().await;
        }
        updated
    }

    pub async fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist().await;
    }

    async fn persist(&self) {
        if let Err(e) = self.storage.put(keys::CART, &self.cart).await {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }
}
