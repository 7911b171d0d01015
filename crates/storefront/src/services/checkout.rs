//! Checkout session request builder.
//!
//! Turns cart lines into a Stripe Checkout Session request. Everything is
//! charged in the base currency (AED) regardless of the display currency.
//!
//! A discount code is resolved to a Stripe promotion code before the session
//! is created. A match is attached directly; no match (or a failed lookup)
//! leaves the promotion-code field open on the Stripe page instead. The two
//! are never sent together.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use thiserror::Error;

use noor_core::{CartItem, CurrencyCode};

use crate::services::stripe::{CheckoutSession, StripeClient, StripeError};

/// Stripe metadata values are limited to 500 characters.
const METADATA_VALUE_LIMIT: usize = 500;

/// Countries Checkout collects shipping addresses for.
pub const SHIPPING_COUNTRIES: &[&str] = &[
    "AE", "SA", "QA", "KW", "BH", "OM", "US", "CA", "GB", "FR", "DE", "NL", "BE", "IT", "ES",
];

/// A shipping tier offered on the Stripe page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingTier {
    pub display_name: &'static str,
    /// Price in fils.
    pub amount: i64,
    pub min_business_days: u32,
    pub max_business_days: u32,
}

pub const SHIPPING_TIERS: [ShippingTier; 2] = [
    ShippingTier {
        display_name: "Standard Shipping",
        amount: 0,
        min_business_days: 5,
        max_business_days: 7,
    },
    ShippingTier {
        display_name: "Express Shipping",
        amount: 5_000,
        min_business_days: 1,
        max_business_days: 3,
    },
];

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("price out of range for {0}")]
    InvalidPrice(String),

    #[error(transparent)]
    Stripe(#[from] StripeError),
}

/// How the discount is applied to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionHandling {
    /// Attach this promotion code id.
    Apply(String),
    /// Let the customer type a code on the Stripe page.
    AllowEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub description: String,
    /// Unit price in fils.
    pub unit_amount: i64,
    pub quantity: u32,
    pub image: Option<String>,
}

/// A Checkout Session request ready to be form-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub line_items: Vec<LineItem>,
    pub promotion: PromotionHandling,
    pub discount_code: Option<String>,
    pub items_metadata: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Serialize)]
struct ItemSummary<'a> {
    id: &'a str,
    size: &'a str,
    color: &'a str,
    qty: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<&'a str>,
}

impl CheckoutRequest {
    /// Build the request for `items`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for no items and
    /// [`CheckoutError::InvalidPrice`] if a price cannot be expressed in fils.
    pub fn build(
        items: &[CartItem],
        promotion: PromotionHandling,
        discount_code: Option<&str>,
        base_url: &str,
    ) -> Result<Self, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let base_url = base_url.trim_end_matches('/');
        let line_items = items
            .iter()
            .map(|item| {
                Ok(LineItem {
                    name: item.name.clone(),
                    description: describe(item),
                    unit_amount: to_fils(item.unit_price)
                        .ok_or_else(|| CheckoutError::InvalidPrice(item.product_id.clone()))?,
                    quantity: item.quantity,
                    image: absolute_image_url(&item.image, base_url),
                })
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        Ok(Self {
            line_items,
            promotion,
            discount_code: normalize_discount_code(discount_code),
            items_metadata: items_metadata(items),
            success_url: format!("{base_url}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base_url}/cart"),
        })
    }

    /// Stripe form parameters for `POST /v1/checkout/sessions`.
    #[must_use]
    pub fn to_form_params(&self) -> Vec<(String, String)> {
        let currency = CurrencyCode::BASE.as_str().to_ascii_lowercase();
        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), self.success_url.clone()),
            ("cancel_url".into(), self.cancel_url.clone()),
            ("billing_address_collection".into(), "required".into()),
        ];

        for (i, item) in self.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((format!("{prefix}[price_data][currency]"), currency.clone()));
            params.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
            if !item.description.is_empty() {
                params.push((
                    format!("{prefix}[price_data][product_data][description]"),
                    item.description.clone(),
                ));
            }
            if let Some(image) = &item.image {
                params.push((
                    format!("{prefix}[price_data][product_data][images][0]"),
                    image.clone(),
                ));
            }
            params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }

        for (i, country) in SHIPPING_COUNTRIES.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                (*country).to_string(),
            ));
        }

        for (i, tier) in SHIPPING_TIERS.iter().enumerate() {
            let prefix = format!("shipping_options[{i}][shipping_rate_data]");
            params.extend([
                (format!("{prefix}[type]"), "fixed_amount".to_string()),
                (format!("{prefix}[display_name]"), tier.display_name.to_string()),
                (format!("{prefix}[fixed_amount][amount]"), tier.amount.to_string()),
                (format!("{prefix}[fixed_amount][currency]"), currency.clone()),
                (
                    format!("{prefix}[delivery_estimate][minimum][unit]"),
                    "business_day".to_string(),
                ),
                (
                    format!("{prefix}[delivery_estimate][minimum][value]"),
                    tier.min_business_days.to_string(),
                ),
                (
                    format!("{prefix}[delivery_estimate][maximum][unit]"),
                    "business_day".to_string(),
                ),
                (
                    format!("{prefix}[delivery_estimate][maximum][value]"),
                    tier.max_business_days.to_string(),
                ),
            ]);
        }

        match &self.promotion {
            PromotionHandling::Apply(promotion_id) => {
                params.push(("discounts[0][promotion_code]".into(), promotion_id.clone()));
            }
            PromotionHandling::AllowEntry => {
                params.push(("allow_promotion_codes".into(), "true".into()));
            }
        }

        params.push(("metadata[items]".into(), self.items_metadata.clone()));
        if let Some(code) = &self.discount_code {
            params.push(("metadata[discount_code]".into(), code.clone()));
        }

        params
    }
}

/// Resolve the discount code and create the Stripe session.
///
/// # Errors
///
/// Returns error for an empty cart, an unrepresentable price, or a failed
/// session creation. A failed promotion lookup is not an error.
pub async fn create_checkout_session(
    stripe: &StripeClient,
    items: &[CartItem],
    discount_code: Option<&str>,
    base_url: &str,
) -> Result<CheckoutSession, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let discount_code = normalize_discount_code(discount_code);
    let promotion = match &discount_code {
        Some(code) => resolve_promotion(stripe, code).await,
        None => PromotionHandling::AllowEntry,
    };

    let request = CheckoutRequest::build(items, promotion, discount_code.as_deref(), base_url)?;
    Ok(stripe.create_checkout_session(&request.to_form_params()).await?)
}

async fn resolve_promotion(stripe: &StripeClient, code: &str) -> PromotionHandling {
    match stripe.find_promotion_code(code).await {
        Ok(Some(promo)) => {
            tracing::info!(code = %code, promotion_id = %promo.id, "Applying promotion code");
            PromotionHandling::Apply(promo.id)
        }
        Ok(None) => {
            tracing::info!(code = %code, "No matching promotion code");
            PromotionHandling::AllowEntry
        }
        Err(e) => {
            tracing::warn!(error = %e, code = %code, "Promotion code lookup failed");
            PromotionHandling::AllowEntry
        }
    }
}

/// Trimmed discount code; blank means none.
#[must_use]
pub fn normalize_discount_code(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|code| !code.is_empty())
        .map(String::from)
}

fn describe(item: &CartItem) -> String {
    let mut parts = vec![format!("Size: {}", item.size), format!("Color: {}", item.color)];
    if let Some(length) = item.custom_length.as_deref().filter(|l| !l.trim().is_empty()) {
        parts.push(format!("Length: {length}"));
    }
    if let Some(notes) = item.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        parts.push(format!("Notes: {notes}"));
    }
    parts.join(" | ")
}

fn to_fils(price: Decimal) -> Option<i64> {
    (price * Decimal::ONE_HUNDRED).round().to_i64()
}

fn absolute_image_url(image: &str, base_url: &str) -> Option<String> {
    let image = image.trim();
    if image.is_empty() {
        None
    } else if image.starts_with("http://") || image.starts_with("https://") {
        Some(image.to_string())
    } else {
        Some(format!("{base_url}/{}", image.trim_start_matches('/')))
    }
}

fn items_metadata(items: &[CartItem]) -> String {
    let summary: Vec<ItemSummary<'_>> = items
        .iter()
        .map(|item| ItemSummary {
            id: &item.product_id,
            size: &item.size,
            color: &item.color,
            qty: item.quantity,
            length: item.custom_length.as_deref(),
        })
        .collect();
    let json = serde_json::to_string(&summary).unwrap_or_default();
    json.chars().take(METADATA_VALUE_LIMIT).collect()
}
