//! Per-tab visitor session state.
//!
//! A [`VisitorSession`] is created when a tab starts reporting and is mutated
//! by page views, cart events, contact details and visibility changes. All
//! methods take the current time explicitly so the state machine stays
//! deterministic under test.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attribution::UtmParams;
use super::device::DeviceInfo;
use super::identity::VisitorIdentity;
use crate::services::geo::GeoResult;

/// Page views kept per session; older entries are dropped.
pub const MAX_PAGE_VIEWS: usize = 500;

/// Cart events kept per session; older entries are dropped.
pub const MAX_CART_EVENTS: usize = 500;

/// Snapshot kinds pushed to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorEvent {
    NewVisitor,
    ReturningVisitor,
    ContactInfo,
}

impl VisitorEvent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewVisitor => "new_visitor",
            Self::ReturningVisitor => "returning_visitor",
            Self::ContactInfo => "contact_info",
        }
    }
}

/// What happened to a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartAction {
    Add,
    Remove,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub path: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    /// Whole seconds until the next page view; `None` while on the page.
    pub time_on_page: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEvent {
    pub action: CartAction,
    pub product_id: String,
    pub product_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Contact details a visitor has typed in somewhere on the site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactInfo {
    /// Overwrite fields with the non-blank fields of `update`.
    ///
    /// Returns whether anything changed.
    pub fn merge(&mut self, update: Self) -> bool {
        let mut changed = false;
        for (slot, value) in [
            (&mut self.name, update.name),
            (&mut self.email, update.email),
            (&mut self.phone, update.phone),
        ] {
            if let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
                && slot.as_deref() != Some(value.as_str())
            {
                *slot = Some(value);
                changed = true;
            }
        }
        changed
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorLocation {
    pub country_code: String,
    pub country_name: String,
    pub city: Option<String>,
}

impl From<&GeoResult> for VisitorLocation {
    fn from(geo: &GeoResult) -> Self {
        Self {
            country_code: geo.country_code.clone(),
            country_name: geo.country_name.clone(),
            city: geo.city.clone(),
        }
    }
}

/// Everything known when a tab starts reporting.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub identity: VisitorIdentity,
    pub device: DeviceInfo,
    pub referrer: String,
    pub utm_params: UtmParams,
    pub location: Option<VisitorLocation>,
    pub now: DateTime<Utc>,
}

/// Analytics state for one browser tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSession {
    pub visitor_id: Uuid,
    pub session_id: Uuid,
    pub is_new_visitor: bool,
    pub visit_count: u32,
    pub first_visit: DateTime<Utc>,
    pub current_visit: DateTime<Utc>,
    pub location: Option<VisitorLocation>,
    pub device: DeviceInfo,
    pub page_views: VecDeque<PageView>,
    /// Seconds the tab has been in the foreground.
    pub total_time_on_site: u64,
    pub referrer: String,
    pub utm_params: UtmParams,
    pub contact_info: Option<ContactInfo>,
    pub cart_events: VecDeque<CartEvent>,
    pub is_live: bool,
}

impl VisitorSession {
    /// Activate a session. The tab starts in the foreground.
    #[must_use]
    pub fn start(session_id: Uuid, start: SessionStart) -> Self {
        Self {
            visitor_id: start.identity.visitor_id,
            session_id,
            is_new_visitor: start.identity.is_new_visitor(),
            visit_count: start.identity.visit_count,
            first_visit: start.identity.first_visit,
            current_visit: start.now,
            location: start.location,
            device: start.device,
            page_views: VecDeque::new(),
            total_time_on_site: 0,
            referrer: start.referrer,
            utm_params: start.utm_params,
            contact_info: None,
            cart_events: VecDeque::new(),
            is_live: true,
        }
    }

    /// Snapshot kind pushed once on activation.
    #[must_use]
    pub const fn activation_event(&self) -> VisitorEvent {
        if self.visit_count <= 1 {
            VisitorEvent::NewVisitor
        } else {
            VisitorEvent::ReturningVisitor
        }
    }

    /// Close the current page's timer and record a new page view.
    pub fn track_page_view(&mut self, path: &str, title: &str, now: DateTime<Utc>) {
        if let Some(previous) = self.page_views.back_mut() {
            let elapsed = now.signed_duration_since(previous.timestamp).num_seconds();
            previous.time_on_page = Some(u64::try_from(elapsed).unwrap_or(0));
        }

        self.page_views.push_back(PageView {
            path: path.to_string(),
            title: title.to_string(),
            timestamp: now,
            time_on_page: None,
        });
        if self.page_views.len() > MAX_PAGE_VIEWS {
            self.page_views.pop_front();
        }
    }

    pub fn track_cart_event(
        &mut self,
        action: CartAction,
        product_id: &str,
        product_name: &str,
        now: DateTime<Utc>,
    ) {
        self.cart_events.push_back(CartEvent {
            action,
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            timestamp: now,
        });
        if self.cart_events.len() > MAX_CART_EVENTS {
            self.cart_events.pop_front();
        }
    }

    /// Merge newly entered contact details.
    ///
    /// Returns whether anything changed.
    pub fn set_contact_info(&mut self, update: ContactInfo) -> bool {
        let current = self.contact_info.get_or_insert_with(ContactInfo::default);
        let changed = current.merge(update);
        if current.is_empty() {
            self.contact_info = None;
        }
        changed
    }

    pub const fn set_visibility(&mut self, visible: bool) {
        self.is_live = visible;
    }

    /// Count one foreground second.
    pub const fn tick(&mut self) {
        if self.is_live {
            self.total_time_on_site = self.total_time_on_site.saturating_add(1);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 9, 0, 0).unwrap()
    }

    fn session(visit_count: u32) -> VisitorSession {
        VisitorSession::start(
            Uuid::new_v4(),
            SessionStart {
                identity: VisitorIdentity {
                    visitor_id: Uuid::new_v4(),
                    visit_count,
                    first_visit: t0(),
                },
                device: DeviceInfo::default(),
                referrer: "direct".to_string(),
                utm_params: UtmParams::default(),
                location: None,
                now: t0(),
            },
        )
    }

    #[test]
    fn test_activation_event() {
        assert_eq!(session(1).activation_event(), VisitorEvent::NewVisitor);
        assert!(session(1).is_new_visitor);
        assert_eq!(session(4).activation_event(), VisitorEvent::ReturningVisitor);
    }

    #[test]
    fn test_page_view_closes_previous() {
        let mut s = session(1);
        s.track_page_view("/", "Home", t0());
        s.track_page_view("/products/noor", "Noor Abaya", t0() + Duration::seconds(42));

        assert_eq!(s.page_views.len(), 2);
        assert_eq!(s.page_views[0].time_on_page, Some(42));
        assert_eq!(s.page_views[1].time_on_page, None);
    }

    #[test]
    fn test_page_view_clock_skew_clamps_to_zero() {
        let mut s = session(1);
        s.track_page_view("/", "Home", t0());
        s.track_page_view("/about", "About", t0() - Duration::seconds(5));
        assert_eq!(s.page_views[0].time_on_page, Some(0));
    }

    #[test]
    fn test_history_is_capped() {
        let mut s = session(1);
        for i in 0..(MAX_PAGE_VIEWS + 3) {
            s.track_page_view(&format!("/p/{i}"), "Page", t0());
        }
        assert_eq!(s.page_views.len(), MAX_PAGE_VIEWS);
        assert_eq!(s.page_views[0].path, "/p/3");

        for _ in 0..(MAX_CART_EVENTS + 1) {
            s.track_cart_event(CartAction::Add, "noor", "Noor", t0());
        }
        assert_eq!(s.cart_events.len(), MAX_CART_EVENTS);
    }

    #[test]
    fn test_tick_only_when_live() {
        let mut s = session(1);
        s.tick();
        s.tick();
        s.set_visibility(false);
        s.tick();
        assert_eq!(s.total_time_on_site, 2);
        assert!(!s.is_live);

        s.set_visibility(true);
        s.tick();
        assert_eq!(s.total_time_on_site, 3);
    }

    #[test]
    fn test_contact_info_merges_non_empty_fields() {
        let mut s = session(1);
        assert!(s.set_contact_info(ContactInfo {
            name: Some("Mariam".to_string()),
            email: Some("mariam@example.com".to_string()),
            phone: None,
        }));
        assert!(s.set_contact_info(ContactInfo {
            name: Some("  ".to_string()),
            email: None,
            phone: Some("+971500000000".to_string()),
        }));
        assert!(!s.set_contact_info(ContactInfo {
            name: Some("Mariam".to_string()),
            ..ContactInfo::default()
        }));

        let info = s.contact_info.unwrap();
        assert_eq!(info.name.as_deref(), Some("Mariam"));
        assert_eq!(info.email.as_deref(), Some("mariam@example.com"));
        assert_eq!(info.phone.as_deref(), Some("+971500000000"));
    }

    #[test]
    fn test_blank_contact_info_leaves_none() {
        let mut s = session(1);
        assert!(!s.set_contact_info(ContactInfo::default()));
        assert!(s.contact_info.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(session(2)).unwrap();
        assert_eq!(json["visitCount"], 2);
        assert_eq!(json["isLive"], true);
        assert_eq!(json["device"]["type"], "desktop");
    }
}
