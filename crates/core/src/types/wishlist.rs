//! Wishlist container, deduplicated by product id.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A saved product reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub image: String,
    pub category: String,
}

/// Ordered set of wishlist entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an entry unless its product is already saved.
    ///
    /// Returns whether the wishlist changed.
    pub fn add_item(&mut self, item: WishlistItem) -> bool {
        if self.contains(&item.product_id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Returns whether an entry was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }

    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn saved(product_id: &str) -> WishlistItem {
        WishlistItem {
            product_id: product_id.to_string(),
            name: format!("Abaya {product_id}"),
            unit_price: Decimal::new(480, 0),
            image: format!("/images/{product_id}.jpg"),
            category: "classic".to_string(),
        }
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.add_item(saved("noor")));
        assert!(!wishlist.add_item(saved("noor")));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_contains_and_remove() {
        let mut wishlist = Wishlist::new();
        wishlist.add_item(saved("noor"));
        wishlist.add_item(saved("layla"));

        assert!(wishlist.contains("layla"));
        assert!(wishlist.remove_item("layla"));
        assert!(!wishlist.contains("layla"));
        assert!(!wishlist.remove_item("layla"));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut wishlist = Wishlist::new();
        wishlist.add_item(saved("noor"));
        wishlist.clear();
        assert!(wishlist.is_empty());
        assert!(!wishlist.contains("noor"));
    }
}
