//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /robots.txt             - Launch-mode aware robots
//! GET  /sitemap.xml            - Launch-mode aware sitemap
//!
//! # Catalog
//! GET  /api/products           - Product listing (?category=)
//! GET  /api/products/{id}      - Product detail
//!
//! # Cart and wishlist (session backed)
//! GET  /api/cart               - Cart view
//! POST /api/cart/add           - Add a line
//! POST /api/cart/update        - Set a line's quantity
//! POST /api/cart/remove        - Remove a line
//! GET  /api/wishlist           - Wishlist view
//! POST /api/wishlist/add       - Save a product
//! POST /api/wishlist/remove    - Forget a product
//! POST /api/wishlist/clear     - Empty the wishlist
//!
//! # Locale
//! GET  /api/currency           - Currencies and the selected one
//! POST /api/currency           - Select a currency
//! GET  /api/locale             - Detected locale and popup suggestion
//! POST /api/locale/dismiss     - Answer the locale popup
//! GET  /api/consent            - Cookie banner answer
//! POST /api/consent            - Record the cookie banner answer
//!
//! # Checkout (rate limited)
//! POST /api/checkout           - Create a Stripe Checkout Session
//! GET  /checkout/success       - Verify payment, clear cart, record order
//!
//! # Forms (rate limited)
//! POST /api/contact            - Contact form to Slack
//! POST /api/subscribe          - Newsletter sign-up
//!
//! # Orders
//! GET   /api/orders            - Lookup (?id=) or list (?status=)
//! POST  /api/orders            - Create a pending order
//! PATCH /api/orders            - Change an order's status
//!
//! # Analytics beacons (rate limited)
//! POST /api/analytics/sessions                    - Start a tab session
//! POST /api/analytics/sessions/{id}/page-views
//! POST /api/analytics/sessions/{id}/cart-events
//! POST /api/analytics/sessions/{id}/contact
//! POST /api/analytics/sessions/{id}/visibility
//! ```

pub mod analytics;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod currency;
pub mod locale;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod seo;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{beacon_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/clear", post(wishlist::clear))
}

/// Create the currency, locale and consent routes router.
pub fn locale_routes() -> Router<AppState> {
    Router::new()
        .route("/api/currency", get(currency::show).post(currency::update))
        .route("/api/locale", get(locale::show))
        .route("/api/locale/dismiss", post(locale::dismiss))
        .route(
            "/api/consent",
            get(locale::consent).post(locale::set_consent),
        )
}

/// Create the form routes router (checkout, contact, newsletter).
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", post(checkout::create))
        .route("/api/contact", post(contact::submit))
        .route("/api/subscribe", post(newsletter::subscribe))
        .layer(form_rate_limiter())
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(orders::index)
            .post(orders::create)
            .patch(orders::update_status),
    )
}

/// Create the analytics beacon routes router.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(analytics::start))
        .route("/sessions/{id}/page-views", post(analytics::page_view))
        .route("/sessions/{id}/cart-events", post(analytics::cart_event))
        .route("/sessions/{id}/contact", post(analytics::contact))
        .route("/sessions/{id}/visibility", post(analytics::visibility))
        .layer(beacon_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // SEO documents
        .route("/robots.txt", get(seo::robots))
        .route("/sitemap.xml", get(seo::sitemap))
        // Catalog
        .nest("/api/products", product_routes())
        // Session-backed visitor state
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .merge(locale_routes())
        // Checkout and forms
        .merge(form_routes())
        .route("/checkout/success", get(checkout::success))
        // Orders
        .nest("/api/orders", order_routes())
        // Analytics
        .nest("/api/analytics", analytics_routes())
}
