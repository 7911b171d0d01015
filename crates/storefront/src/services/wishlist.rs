//! Write-through wishlist container.

use noor_core::{Wishlist, WishlistItem};

use crate::models::session::keys;
use crate::storage::Storage;

/// A visitor's wishlist bound to its backing storage.
pub struct WishlistStore<S> {
    storage: S,
    wishlist: Wishlist,
}

impl<S: Storage> WishlistStore<S> {
    /// Load the persisted wishlist, starting empty on a missing or unreadable
    /// value.
    pub async fn load(storage: S) -> Self {
        let wishlist = match storage.fetch::<Wishlist>(keys::WISHLIST).await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load wishlist, starting empty");
                Wishlist::new()
            }
        };
        Self { storage, wishlist }
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        self.wishlist.items()
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &str) -> bool {
        self.wishlist.contains(product_id)
    }

    /// Save a product. Already-saved products are left as they are.
    pub async fn add_item(&mut self, item: WishlistItem) -> bool {
        let added = self.wishlist.add_item(item);
        if added {
            self.persist().await;
        }
        added
    }

    pub async fn remove_item(&mut self, product_id: &str) -> bool {
        let removed = self.wishlist.remove_item(product_id);
        if removed {
            self.persist().await;
        }
        removed
    }

    pub async fn clear_wishlist(&mut self) {
        self.wishlist.clear();
        self.persist().await;
    }

    async fn persist(&self) {
        if let Err(e) = self.storage.put(keys::WISHLIST, &self.wishlist).await {
            tracing::warn!(error = %e, "Failed to persist wishlist");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    fn saved(product_id: &str) -> WishlistItem {
        WishlistItem {
            product_id: product_id.to_string(),
            name: format!("Abaya {product_id}"),
            unit_price: Decimal::new(650, 0),
            image: format!("/images/{product_id}.jpg"),
            category: "occasion".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_is_idempotent_and_persisted() {
        let storage = MemoryStorage::new();
        let mut store = WishlistStore::load(storage.clone()).await;
        assert!(store.add_item(saved("noor")).await);
        assert!(!store.add_item(saved("noor")).await);

        let reloaded = WishlistStore::load(storage).await;
        assert_eq!(reloaded.items().len(), 1);
        assert!(reloaded.is_in_wishlist("noor"));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let storage = MemoryStorage::new();
        let mut store = WishlistStore::load(storage.clone()).await;
        store.add_item(saved("noor")).await;
        store.add_item(saved("layla")).await;

        assert!(store.remove_item("noor").await);
        assert!(!store.remove_item("noor").await);
        store.clear_wishlist().await;

        let reloaded = WishlistStore::load(storage).await;
        assert!(reloaded.items().is_empty());
    }
}
