//! In-memory order store.
//!
//! Orders are kept for the lifetime of the process only. Ids look like
//! `ORD-<unix millis>`; two orders created in the same millisecond get a
//! numeric suffix.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use noor_core::{CartItem, CurrencyCode, Email, InvalidTransition, OrderStatus};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found: {0}")]
    NotFound(String),

    #[error("order has no items")]
    EmptyOrder,

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub items: Vec<CartItem>,
    /// Sum of line totals in `currency`.
    pub subtotal: Decimal,
    /// Amount charged in `currency`, after discounts and shipping.
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    /// Payment processor reference (checkout session id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`OrderStore::create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer: Customer,
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Charged amount reported by the payment processor. Defaults to the
    /// subtotal.
    #[serde(skip)]
    pub amount_charged: Option<Decimal>,
}

/// Process-local order list, newest last.
#[derive(Clone, Default)]
pub struct OrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending order charged in the base currency.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyOrder`] if `new.items` is empty.
    pub fn create(&self, new: NewOrder, now: DateTime<Utc>) -> Result<Order, OrderError> {
        if new.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let order = insert(&mut orders, new, now);
        drop(orders);

        tracing::info!(order_id = %order.id, total = %order.total, "Order created");
        Ok(order)
    }

    /// Create an order unless one already exists for its payment reference.
    ///
    /// The lookup and the insert happen under one write lock, so concurrent
    /// calls for the same reference record a single order. Returns the order
    /// and whether it was created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyOrder`] if a new order would have no items.
    pub fn create_once(
        &self,
        new: NewOrder,
        now: DateTime<Utc>,
    ) -> Result<(Order, bool), OrderError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);

        let existing = new.payment_reference.as_deref().and_then(|reference| {
            orders
                .iter()
                .find(|order| order.payment_reference.as_deref() == Some(reference))
        });
        if let Some(existing) = existing {
            return Ok((existing.clone(), false));
        }

        if new.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let order = insert(&mut orders, new, now);
        drop(orders);

        tracing::info!(order_id = %order.id, total = %order.total, "Order created");
        Ok((order, true))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Order> {
        self.read(|orders| orders.iter().find(|order| order.id == id).cloned())
    }

    /// Order created for a payment reference, if any.
    #[must_use]
    pub fn find_by_payment_reference(&self, reference: &str) -> Option<Order> {
        self.read(|orders| {
            orders
                .iter()
                .find(|order| order.payment_reference.as_deref() == Some(reference))
                .cloned()
        })
    }

    /// Orders, newest first, optionally filtered by status.
    #[must_use]
    pub fn list(&self, status: Option<OrderStatus>) -> Vec<Order> {
        self.read(|orders| {
            orders
                .iter()
                .rev()
                .filter(|order| status.is_none_or(|s| order.status == s))
                .cloned()
                .collect()
        })
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for an unknown id and
    /// [`OrderError::InvalidTransition`] if the move is not allowed.
    pub fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;

        order.status = order.status.transition(status)?;
        order.updated_at = now;
        let updated = order.clone();
        drop(orders);

        tracing::info!(order_id = %updated.id, status = %updated.status, "Order status updated");
        Ok(updated)
    }

    fn read<R>(&self, f: impl FnOnce(&[Order]) -> R) -> R {
        let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
        f(&orders)
    }
}

fn insert(orders: &mut Vec<Order>, new: NewOrder, now: DateTime<Utc>) -> Order {
    let base_id = format!("ORD-{}", now.timestamp_millis());
    let mut id = base_id.clone();
    let mut suffix = 1_u32;
    while orders.iter().any(|order| order.id == id) {
        suffix += 1;
        id = format!("{base_id}-{suffix}");
    }

    let subtotal: Decimal = new.items.iter().map(CartItem::line_total).sum();
    let order = Order {
        id,
        customer: new.customer,
        subtotal,
        total: new.amount_charged.unwrap_or(subtotal),
        items: new.items,
        currency: CurrencyCode::BASE,
        status: OrderStatus::Pending,
        shipping_address: new.shipping_address,
        payment_reference: new.payment_reference,
        created_at: now,
        updated_at: now,
    };
    orders.push(order.clone());
    order
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap()
    }

    fn new_order(quantity: u32) -> NewOrder {
        NewOrder {
            customer: Customer {
                name: "Huda Saleh".to_string(),
                email: Email::parse("huda@example.com").unwrap(),
                phone: None,
            },
            items: vec![CartItem {
                product_id: "noor-classic".to_string(),
                name: "Noor Classic Abaya".to_string(),
                unit_price: Decimal::new(450, 0),
                image: "/images/noor-classic.jpg".to_string(),
                size: "54".to_string(),
                color: "Black".to_string(),
                quantity,
                custom_length: None,
                notes: None,
            }],
            shipping_address: None,
            payment_reference: Some("cs_test_1".to_string()),
            amount_charged: None,
        }
    }

    #[test]
    fn test_create_pending_order() {
        let store = OrderStore::new();
        let order = store.create(new_order(2), now()).unwrap();

        assert_eq!(order.id, format!("ORD-{}", now().timestamp_millis()));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal, Decimal::new(900, 0));
        assert_eq!(order.total, Decimal::new(900, 0));
        assert_eq!(order.currency, CurrencyCode::AED);
        assert_eq!(store.get(&order.id), Some(order));
    }

    #[test]
    fn test_same_millisecond_ids_are_unique() {
        let store = OrderStore::new();
        let a = store.create(new_order(1), now()).unwrap();
        let b = store.create(new_order(1), now()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(b.id, format!("{}-2", a.id));
    }

    #[test]
    fn test_empty_order_rejected() {
        let mut empty = new_order(1);
        empty.items.clear();
        assert!(matches!(
            OrderStore::new().create(empty, now()),
            Err(OrderError::EmptyOrder)
        ));
    }

    #[test]
    fn test_list_filters_and_orders_newest_first() {
        let store = OrderStore::new();
        let first = store.create(new_order(1), now()).unwrap();
        let second = store
            .create(new_order(1), now() + Duration::seconds(1))
            .unwrap();
        store
            .update_status(&first.id, OrderStatus::Processing, now())
            .unwrap();

        let all = store.list(None);
        assert_eq!(all.len(), 2);
        assert_eq!(all.first().unwrap().id, second.id);

        let processing = store.list(Some(OrderStatus::Processing));
        assert_eq!(processing.len(), 1);
        assert_eq!(processing.first().unwrap().id, first.id);
    }

    #[test]
    fn test_update_status_validates() {
        let store = OrderStore::new();
        let order = store.create(new_order(1), now()).unwrap();
        let later = now() + Duration::minutes(5);

        let updated = store
            .update_status(&order.id, OrderStatus::Cancelled, later)
            .unwrap();
        assert_eq!(updated.updated_at, later);

        let err = store
            .update_status(&order.id, OrderStatus::Shipped, later)
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition(_)));

        let err = store
            .update_status("ORD-0", OrderStatus::Shipped, later)
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[test]
    fn test_find_by_payment_reference() {
        let store = OrderStore::new();
        let order = store.create(new_order(1), now()).unwrap();
        assert_eq!(
            store.find_by_payment_reference("cs_test_1").map(|o| o.id),
            Some(order.id)
        );
        assert!(store.find_by_payment_reference("cs_other").is_none());
    }

    #[test]
    fn test_charged_amount_overrides_total() {
        let store = OrderStore::new();
        let mut discounted = new_order(2);
        discounted.amount_charged = Some(Decimal::new(720, 0));

        let order = store.create(discounted, now()).unwrap();
        assert_eq!(order.subtotal, Decimal::new(900, 0));
        assert_eq!(order.total, Decimal::new(720, 0));
    }

    #[test]
    fn test_create_once_per_payment_reference() {
        let store = OrderStore::new();
        let (first, created) = store.create_once(new_order(1), now()).unwrap();
        assert!(created);

        let (again, created) = store
            .create_once(new_order(3), now() + Duration::seconds(1))
            .unwrap();
        assert!(!created);
        assert_eq!(again, first);

        // The existing order answers even when the retry has no items.
        let mut emptied = new_order(1);
        emptied.items.clear();
        let (again, created) = store.create_once(emptied, now()).unwrap();
        assert!(!created);
        assert_eq!(again.id, first.id);

        assert_eq!(store.list(None).len(), 1);
    }

    #[test]
    fn test_create_once_concurrent_calls_record_one_order() {
        let store = OrderStore::new();
        let handles = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.create_once(new_order(1), now()).unwrap())
            })
            .collect::<Vec<_>>();

        let created = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|(_, created)| *created)
            .count();
        assert_eq!(created, 1);
        assert_eq!(store.list(None).len(), 1);
    }
}
