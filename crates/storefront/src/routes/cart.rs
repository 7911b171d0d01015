//! Cart route handlers.
//!
//! The cart lives in the visitor session. Name, price and image always come
//! from the catalog; the client only picks product, options and quantity.

use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use noor_core::{CartItem, Currency, CurrencyCode};

use super::currency::selected_currency;
use crate::catalog;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::CartStore;

/// Longest accepted free-text option.
const MAX_OPTION_TEXT: usize = 500;

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: Decimal,
    pub display_line_total: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u32,
    /// Total in the base currency.
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub display_total: String,
}

impl CartView {
    fn new(cart: &CartStore<Session>, currency: CurrencyCode) -> Self {
        let display = Currency::get(currency);
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartLineView {
                    item: item.clone(),
                    line_total: item.line_total(),
                    display_line_total: display.format(item.line_total()),
                })
                .collect(),
            item_count: cart.item_count(),
            total: cart.total(),
            currency,
            display_total: display.format(cart.total()),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub size: String,
    pub color: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub custom_length: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: String,
    pub size: String,
    pub color: String,
}

fn optional_text(value: Option<String>, field: &str) -> Result<Option<String>> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    if value.as_ref().is_some_and(|v| v.chars().count() > MAX_OPTION_TEXT) {
        return Err(AppError::BadRequest(format!("{field} is too long")));
    }
    Ok(value)
}

// =============================================================================
// Handlers
// =============================================================================

async fn view(session: Session, cart: &CartStore<Session>) -> Json<CartView> {
    let currency = selected_currency(&session).await;
    Json(CartView::new(cart, currency))
}

/// GET /api/cart
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = CartStore::load(session.clone()).await;
    view(session, &cart).await
}

/// POST /api/cart/add
#[instrument(skip(session))]
pub async fn add(session: Session, Json(body): Json<AddToCartRequest>) -> Result<Json<CartView>> {
    if body.quantity == 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }

    let product = catalog::find(&body.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product '{}'", body.product_id)))?;
    if !product.has_size(&body.size) {
        return Err(AppError::BadRequest(format!("Unknown size '{}'", body.size)));
    }
    if !product.has_color(&body.color) {
        return Err(AppError::BadRequest(format!("Unknown color '{}'", body.color)));
    }

    let mut item = product.cart_item(&body.size, &body.color, body.quantity);
    item.custom_length = optional_text(body.custom_length, "customLength")?;
    item.notes = optional_text(body.notes, "notes")?;

    let mut cart = CartStore::load(session.clone()).await;
    cart.add_item(item).await;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[("product_id", product.id), ("size", &body.size)],
    );

    Ok(view(session, &cart).await)
}

/// POST /api/cart/update
///
/// A quantity of zero removes the line.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = CartStore::load(session.clone()).await;
    let matched = cart
        .update_quantity(&body.product_id, &body.size, &body.color, body.quantity)
        .await;
    if !matched {
        return Err(AppError::NotFound("cart line".to_string()));
    }

    Ok(view(session, &cart).await)
}

/// POST /api/cart/remove
///
/// Removing a line that is not in the cart is not an error.
#[instrument(skip(session))]
pub async fn remove(session: Session, Json(body): Json<RemoveFromCartRequest>) -> Json<CartView> {
    let mut cart = CartStore::load(session.clone()).await;
    if cart
        .remove_item(&body.product_id, &body.size, &body.color)
        .await
    {
        add_breadcrumb("cart", "Removed from cart", &[("product_id", &body.product_id)]);
    }

    view(session, &cart).await
}
