//! Slack message builders for storefront notifications.
//!
//! Provides factory functions for building Block Kit messages for:
//! - Contact form submissions
//! - Newsletter sign-ups
//! - New orders
//! - Visitor session snapshots

use noor_core::{Currency, CurrencyCode, Email};

use super::types::{Block, PlainText};
use crate::services::analytics::{DeviceType, VisitorEvent, VisitorSession};
use crate::services::orders::Order;

/// Page views listed in a visitor snapshot.
const RECENT_PAGE_LIMIT: usize = 5;

/// Build a contact form notification.
#[must_use]
pub fn build_contact_message(
    name: &str,
    email: &Email,
    phone: Option<&str>,
    subject: Option<&str>,
    message: &str,
) -> Vec<Block> {
    let mut fields = vec![("Name", name.to_string()), ("Email", email.to_string())];
    if let Some(phone) = phone {
        fields.push(("Phone", phone.to_string()));
    }
    if let Some(subject) = subject {
        fields.push(("Subject", subject.to_string()));
    }

    vec![
        Block::Header {
            text: PlainText::new("📬 New contact message"),
        },
        Block::fields(fields),
        Block::markdown(quote(message)),
    ]
}

/// Build a newsletter sign-up notification.
#[must_use]
pub fn build_newsletter_message(email: &Email, mailing_list_status: &str) -> Vec<Block> {
    vec![
        Block::Header {
            text: PlainText::new("💌 New newsletter subscriber"),
        },
        Block::fields([("Email", email.as_str()), ("Mailing list", mailing_list_status)]),
    ]
}

/// Build a new order alert.
#[must_use]
pub fn build_order_message(order: &Order) -> Vec<Block> {
    let base = Currency::get(CurrencyCode::BASE);
    let lines = order
        .items
        .iter()
        .map(|item| {
            let mut line = format!(
                "• {} × {} ({}, {})",
                item.quantity, item.name, item.size, item.color
            );
            if let Some(length) = &item.custom_length {
                line.push_str(&format!(", length {length}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut fields = vec![
        ("Order", order.id.clone()),
        ("Total", base.format(order.total)),
    ];
    if order.subtotal != order.total {
        fields.push(("Subtotal", base.format(order.subtotal)));
    }
    fields.push(("Customer", order.customer.name.clone()));
    fields.push(("Email", order.customer.email.to_string()));
    if let Some(phone) = &order.customer.phone {
        fields.push(("Phone", phone.clone()));
    }

    let mut blocks = vec![
        Block::Header {
            text: PlainText::new("🛍️ New order"),
        },
        Block::fields(fields),
        Block::markdown(format!("*Items*\n{lines}")),
    ];

    if let Some(address) = &order.shipping_address {
        blocks.push(Block::context(format!(
            "Ship to {}, {}, {}",
            address.line1, address.city, address.country
        )));
    }

    blocks
}

/// Build a visitor session snapshot.
#[must_use]
pub fn build_visitor_message(event: VisitorEvent, session: &VisitorSession) -> Vec<Block> {
    let title = match event {
        VisitorEvent::NewVisitor => "👋 New visitor",
        VisitorEvent::ReturningVisitor => "🔁 Returning visitor",
        VisitorEvent::ContactInfo => "📇 Visitor left contact details",
    };

    let location = session.location.as_ref().map_or_else(
        || "Unknown".to_string(),
        |loc| match &loc.city {
            Some(city) => format!("{city}, {}", loc.country_name),
            None => loc.country_name.clone(),
        },
    );

    let device = format!(
        "{} · {} · {}",
        match session.device.device_type {
            DeviceType::Mobile => "Mobile",
            DeviceType::Tablet => "Tablet",
            DeviceType::Desktop => "Desktop",
        },
        session.device.browser,
        session.device.os
    );

    let mut fields = vec![
        ("Location", location),
        ("Device", device),
        ("Referrer", session.referrer.clone()),
        ("Visit", format!("#{}", session.visit_count)),
        ("Time on site", format_duration(session.total_time_on_site)),
    ];
    if let Some(campaign) = &session.utm_params.campaign {
        fields.push(("Campaign", campaign.clone()));
    }

    let mut blocks = vec![
        Block::Header {
            text: PlainText::new(title),
        },
        Block::fields(fields),
    ];

    if let Some(contact) = &session.contact_info {
        let details = [&contact.name, &contact.email, &contact.phone]
            .into_iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(" · ");
        blocks.push(Block::markdown(format!("*Contact*\n{details}")));
    }

    if !session.page_views.is_empty() {
        let pages = session
            .page_views
            .iter()
            .rev()
            .take(RECENT_PAGE_LIMIT)
            .map(|view| format!("• `{}` {}", view.path, view.title))
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(Block::markdown(format!("*Recent pages*\n{pages}")));
    }

    blocks.push(Block::Divider);
    blocks.push(Block::context(format!(
        "Visitor `{}` • session `{}`",
        session.visitor_id, session.session_id
    )));

    blocks
}

fn quote(text: &str) -> String {
    text.lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_duration(seconds: u64) -> String {
    match (seconds / 60, seconds % 60) {
        (0, secs) => format!("{secs}s"),
        (mins, secs) => format!("{mins}m {secs}s"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::services::analytics::{
        DeviceInfo, SessionStart, UtmParams, VisitorIdentity, VisitorLocation,
    };
    use crate::services::orders::{Customer, NewOrder, OrderStore};
    use noor_core::CartItem;

    fn to_json(blocks: &[Block]) -> String {
        serde_json::to_string(blocks).unwrap()
    }

    #[test]
    fn test_contact_message() {
        let email = Email::parse("reem@example.com").unwrap();
        let blocks = build_contact_message(
            "Reem",
            &email,
            Some("+97150"),
            None,
            "Do you ship to Jeddah?\nThanks",
        );
        let json = to_json(&blocks);
        assert!(json.contains("reem@example.com"));
        assert!(json.contains("+97150"));
        assert!(json.contains("> Do you ship to Jeddah?\\n> Thanks"));
        assert!(!json.contains("Subject"));
    }

    #[test]
    fn test_newsletter_message() {
        let email = Email::parse("sara@example.com").unwrap();
        let json = to_json(&build_newsletter_message(&email, "subscribed"));
        assert!(json.contains("sara@example.com"));
        assert!(json.contains("subscribed"));
    }

    #[test]
    fn test_order_message() {
        let order = OrderStore::new()
            .create(
                NewOrder {
                    customer: Customer {
                        name: "Huda".to_string(),
                        email: Email::parse("huda@example.com").unwrap(),
                        phone: None,
                    },
                    items: vec![CartItem {
                        product_id: "layla".to_string(),
                        name: "Layla Open Abaya".to_string(),
                        unit_price: Decimal::new(1200, 0),
                        image: String::new(),
                        size: "56".to_string(),
                        color: "Sand".to_string(),
                        quantity: 1,
                        custom_length: Some("150cm".to_string()),
                        notes: None,
                    }],
                    shipping_address: None,
                    payment_reference: None,
                    amount_charged: None,
                },
                Utc::now(),
            )
            .unwrap();

        let json = to_json(&build_order_message(&order));
        assert!(json.contains(&order.id));
        assert!(json.contains("1,200.00 AED"));
        assert!(!json.contains("Subtotal"));
        assert!(json.contains("1 × Layla Open Abaya (56, Sand), length 150cm"));
    }

    #[test]
    fn test_visitor_message() {
        let mut session = VisitorSession::start(
            Uuid::new_v4(),
            SessionStart {
                identity: VisitorIdentity {
                    visitor_id: Uuid::new_v4(),
                    visit_count: 2,
                    first_visit: Utc::now(),
                },
                device: DeviceInfo::default(),
                referrer: "instagram.com".to_string(),
                utm_params: UtmParams {
                    campaign: Some("ramadan".to_string()),
                    ..UtmParams::default()
                },
                location: Some(VisitorLocation {
                    country_code: "AE".to_string(),
                    country_name: "United Arab Emirates".to_string(),
                    city: Some("Dubai".to_string()),
                }),
                now: Utc::now(),
            },
        );
        session.track_page_view("/collections/occasion", "Occasion", Utc::now());
        session.total_time_on_site = 75;

        let blocks = build_visitor_message(VisitorEvent::ReturningVisitor, &session);
        let json = to_json(&blocks);
        assert!(json.contains("Returning visitor"));
        assert!(json.contains("Dubai, United Arab Emirates"));
        assert!(json.contains("instagram.com"));
        assert!(json.contains("ramadan"));
        assert!(json.contains("1m 15s"));
        assert!(json.contains("/collections/occasion"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(3600), "60m 0s");
    }
}
