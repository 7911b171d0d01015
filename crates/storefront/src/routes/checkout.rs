//! Checkout route handlers.
//!
//! `POST /api/checkout` turns the session cart into a Stripe Checkout
//! Session. Stripe redirects back to `/checkout/success`, which verifies the
//! payment before clearing the cart and recording the order. Reloading the
//! success page is harmless: a session that already produced an order is
//! answered from the order store, and the store records at most one order
//! per payment reference. The order total is the amount Stripe charged.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use noor_core::{CartItem, Email};

use crate::error::{Result, add_breadcrumb};
use crate::services::checkout;
use crate::services::orders::{Customer, NewOrder, ShippingAddress};
use crate::services::slack::build_order_message;
use crate::services::stripe::{CheckoutSession, CustomerDetails};
use crate::services::{CartStore, Order};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[serde(default)]
    pub discount_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub paid: bool,
    pub order: Option<Order>,
}

/// POST /api/checkout
#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    body: Option<Json<CheckoutBody>>,
) -> Result<Json<CheckoutResponse>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let cart = CartStore::load(session).await;

    let checkout_session = checkout::create_checkout_session(
        state.stripe(),
        cart.items(),
        body.discount_code.as_deref(),
        &state.config().base_url,
    )
    .await?;

    add_breadcrumb(
        "checkout",
        "Checkout session created",
        &[("session_id", &checkout_session.id)],
    );

    Ok(Json(CheckoutResponse {
        session_id: checkout_session.id,
        url: checkout_session.url,
    }))
}

/// GET /checkout/success?session_id=
#[instrument(skip(state, session))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SuccessQuery>,
) -> Result<Json<SuccessResponse>> {
    let checkout_session = state
        .stripe()
        .retrieve_checkout_session(&query.session_id)
        .await?;

    if !checkout_session.is_paid() {
        tracing::info!(
            session_id = %checkout_session.id,
            payment_status = ?checkout_session.payment_status,
            "Checkout session not paid, cart kept"
        );
        return Ok(Json(SuccessResponse {
            paid: false,
            order: None,
        }));
    }

    if let Some(order) = state.orders().find_by_payment_reference(&checkout_session.id) {
        return Ok(Json(SuccessResponse {
            paid: true,
            order: Some(order),
        }));
    }

    let mut cart = CartStore::load(session).await;
    let items = cart.items().to_vec();
    cart.clear_cart().await;

    let order = record_order(&state, &checkout_session, items);
    Ok(Json(SuccessResponse { paid: true, order }))
}

fn record_order(
    state: &AppState,
    checkout_session: &CheckoutSession,
    items: Vec<CartItem>,
) -> Option<Order> {
    if items.is_empty() {
        tracing::warn!(session_id = %checkout_session.id, "Paid checkout with an empty cart");
        return state.orders().find_by_payment_reference(&checkout_session.id);
    }

    let details = checkout_session.customer_details.clone().unwrap_or_default();
    let Some(email) = details.email.as_deref().and_then(|e| Email::parse(e).ok()) else {
        tracing::warn!(
            session_id = %checkout_session.id,
            "Paid checkout without a valid email"
        );
        return None;
    };

    let new_order = NewOrder {
        customer: Customer {
            name: details
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Customer".to_string()),
            email,
            phone: details.phone.clone(),
        },
        items,
        shipping_address: shipping_address(&details),
        payment_reference: Some(checkout_session.id.clone()),
        amount_charged: checkout_session.amount_charged(),
    };

    match state.orders().create_once(new_order, Utc::now()) {
        Ok((order, true)) => {
            if let Some(slack) = state.slack() {
                slack.post_in_background(
                    format!("New order {}", order.id),
                    build_order_message(&order),
                );
            }
            Some(order)
        }
        Ok((order, false)) => Some(order),
        Err(e) => {
            tracing::error!(
                error = %e,
                session_id = %checkout_session.id,
                "Failed to record order"
            );
            None
        }
    }
}

fn shipping_address(details: &CustomerDetails) -> Option<ShippingAddress> {
    let address = details.address.as_ref()?;
    Some(ShippingAddress {
        line1: address.line1.clone()?,
        line2: address.line2.clone(),
        city: address.city.clone()?,
        state: address.state.clone(),
        postal_code: address.postal_code.clone(),
        country: address.country.clone()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::stripe::Address;

    #[test]
    fn test_shipping_address_requires_core_fields() {
        let mut details = CustomerDetails {
            address: Some(Address {
                line1: Some("Villa 12, Street 4".to_string()),
                city: Some("Dubai".to_string()),
                country: Some("AE".to_string()),
                ..Address::default()
            }),
            ..CustomerDetails::default()
        };
        let address = shipping_address(&details).unwrap();
        assert_eq!(address.city, "Dubai");

        details.address.as_mut().unwrap().city = None;
        assert!(shipping_address(&details).is_none());
    }
}
