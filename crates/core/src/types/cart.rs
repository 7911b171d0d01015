//! Shopping cart container.
//!
//! A [`Cart`] holds at most one line per [`LineKey`] (product, size, color).
//! Adding a line whose key already exists bumps the existing quantity instead
//! of creating a second line, and lines keep their insertion order.
//!
//! The container is plain data; write-through persistence is layered on top
//! by the storefront.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    /// Unit price in the base currency.
    pub unit_price: Decimal,
    pub image: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CartItem {
    /// Identity of this line within a cart.
    #[must_use]
    pub fn key(&self) -> LineKey<'_> {
        LineKey {
            product_id: &self.product_id,
            size: &self.size,
            color: &self.color,
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Identity key of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub product_id: &'a str,
    pub size: &'a str,
    pub color: &'a str,
}

impl<'a> LineKey<'a> {
    #[must_use]
    pub const fn new(product_id: &'a str, size: &'a str, color: &'a str) -> Self {
        Self {
            product_id,
            size,
            color,
        }
    }
}

/// Ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add a line, merging into an existing line with the same key.
    ///
    /// The quantity is not validated; callers reject zero quantities.
    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self.find_mut(item.key()) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Remove the line with the given key. Returns whether a line was removed.
    pub fn remove_item(&mut self, key: LineKey<'_>) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != key);
        self.items.len() != before
    }

    /// Set the quantity of the line with the given key.
    ///
    /// A quantity of zero removes the line. Returns whether a line matched.
    pub fn update_quantity(&mut self, key: LineKey<'_>, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_item(key);
        }
        match self.find_mut(key) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `unit_price * quantity` over all lines, in the base currency.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn find_mut(&mut self, key: LineKey<'_>) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.key() == key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(product_id: &str, size: &str, color: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: product_id.to_string(),
            name: format!("Abaya {product_id}"),
            unit_price: Decimal::new(price, 0),
            image: format!("/images/{product_id}.jpg"),
            size: size.to_string(),
            color: color.to_string(),
            quantity,
            custom_length: None,
            notes: None,
        }
    }

    #[test]
    fn test_same_key_merges_quantities() {
        let mut cart = Cart::new();
        cart.add_item(item("classic", "M", "black", 450, 1));
        cart.add_item(item("classic", "M", "black", 450, 2));
        cart.add_item(item("classic", "M", "black", 450, 4));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn test_distinct_keys_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(item("classic", "M", "black", 450, 1));
        cart.add_item(item("classic", "L", "black", 450, 1));
        cart.add_item(item("classic", "M", "navy", 450, 1));
        cart.add_item(item("kimono", "M", "black", 520, 1));

        let keys: Vec<_> = cart
            .items()
            .iter()
            .map(|i| (i.product_id.as_str(), i.size.as_str(), i.color.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("classic", "M", "black"),
                ("classic", "L", "black"),
                ("classic", "M", "navy"),
                ("kimono", "M", "black"),
            ]
        );
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(item("classic", "M", "black", 450, 1));
        let before = cart.clone();

        assert!(!cart.remove_item(LineKey::new("classic", "S", "black")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_matching_key() {
        let mut cart = Cart::new();
        cart.add_item(item("classic", "M", "black", 450, 1));
        cart.add_item(item("kimono", "M", "black", 520, 1));

        assert!(cart.remove_item(LineKey::new("classic", "M", "black")));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id, "kimono");
    }

    #[test]
    fn test_total_sums_line_totals() {
        let mut cart = Cart::new();
        cart.add_item(item("a", "M", "black", 50, 2));
        cart.add_item(item("b", "M", "black", 30, 1));

        assert_eq!(cart.total(), Decimal::new(130, 0));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        cart.add_item(item("classic", "M", "black", 450, 1));

        assert!(cart.update_quantity(LineKey::new("classic", "M", "black"), 5));
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(item("classic", "M", "black", 450, 3));

        assert!(cart.update_quantity(LineKey::new("classic", "M", "black"), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_absent_key_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(item("classic", "M", "black", 450, 3));

        assert!(!cart.update_quantity(LineKey::new("classic", "XL", "black"), 9));
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_clear_empties_cart() {
        let mut cart = Cart::new();
        cart.add_item(item("classic", "M", "black", 450, 3));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut cart = Cart::new();
        let mut line = item("classic", "M", "black", 450, 1);
        line.custom_length = Some("58 inches".to_string());
        cart.add_item(line);

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["productId"], "classic");
        assert_eq!(json[0]["customLength"], "58 inches");
        assert!(json[0].get("notes").is_none());

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
