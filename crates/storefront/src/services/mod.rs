//! Business logic services for storefront.
//!
//! # Services
//!
//! - `analytics` - Per-tab visitor sessions with Slack snapshots
//! - `cart` - Session-persisted cart container
//! - `checkout` - Stripe Checkout Session request builder
//! - `geo` - IP geolocation and locale suggestion
//! - `mailing_list` - `MailerLite` newsletter subscriptions
//! - `orders` - In-memory order store
//! - `slack` - Slack incoming-webhook notifications
//! - `stripe` - Stripe API client
//! - `wishlist` - Session-persisted wishlist container

pub mod analytics;
pub mod cart;
pub mod checkout;
pub mod geo;
pub mod mailing_list;
pub mod orders;
pub mod slack;
pub mod stripe;
pub mod wishlist;

pub use analytics::{AnalyticsTracker, TrackerError};
pub use cart::CartStore;
pub use checkout::{CheckoutError, CheckoutRequest, create_checkout_session};
pub use geo::{GeoClient, GeoError, GeoResult, LocaleSuggestion};
pub use mailing_list::{MailingListClient, MailingListError, Subscription};
pub use orders::{Order, OrderError, OrderStore};
pub use slack::{SlackClient, SlackError};
pub use stripe::{StripeClient, StripeError};
pub use wishlist::WishlistStore;
