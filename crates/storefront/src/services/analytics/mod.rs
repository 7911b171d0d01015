//! Visitor analytics.
//!
//! Each browser tab starts a [`VisitorSession`] that records page views, cart
//! activity, contact details and foreground time. Activation and new contact
//! details push a snapshot to Slack.

mod attribution;
mod device;
mod identity;
mod session;
mod tracker;

pub use attribution::{UtmParams, referrer_source};
pub use device::{DeviceInfo, DeviceType};
pub use identity::VisitorIdentity;
pub use session::{
    CartAction, CartEvent, ContactInfo, MAX_CART_EVENTS, MAX_PAGE_VIEWS, PageView, SessionStart,
    VisitorEvent, VisitorLocation, VisitorSession,
};
pub use tracker::{AnalyticsTracker, TrackerError};
