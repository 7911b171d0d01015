//! Visitor analytics beacons.
//!
//! A tab starts a session once, then reports page views, cart activity,
//! contact details and visibility changes against the returned id. Every
//! beacon answers `204 No Content`; an expired session id answers 404 so the
//! client knows to start over.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::catalog;
use crate::error::Result;
use crate::middleware::ClientIp;
use crate::services::analytics::{
    CartAction, ContactInfo, DeviceInfo, SessionStart, UtmParams, VisitorIdentity,
    VisitorLocation, referrer_source,
};
use crate::state::AppState;

/// Longest path or title kept from a page-view beacon.
const MAX_BEACON_TEXT: usize = 2_048;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[serde(default)]
    pub landing_url: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub visitor_id: Uuid,
    pub is_new_visitor: bool,
    pub visit_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct PageViewRequest {
    pub path: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEventRequest {
    pub action: CartAction,
    pub product_id: String,
    #[serde(default)]
    pub product_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

fn truncate(value: &str) -> String {
    value.chars().take(MAX_BEACON_TEXT).collect()
}

/// POST /api/analytics/sessions
#[instrument(skip(state, session, headers, body))]
pub async fn start(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    session: Session,
    headers: HeaderMap,
    body: Option<Json<StartSessionRequest>>,
) -> Json<StartSessionResponse> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let now = Utc::now();

    let identity = VisitorIdentity::load_or_create(&session, now).await;

    let location = match ip {
        Some(addr) => state
            .geo()
            .fetch_geo_data(Some(addr))
            .await
            .as_ref()
            .map(VisitorLocation::from),
        None => None,
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let visitor = state
        .analytics()
        .start_session(SessionStart {
            identity,
            device: DeviceInfo::from_user_agent(user_agent),
            referrer: referrer_source(body.referrer.as_deref()),
            utm_params: body
                .landing_url
                .as_deref()
                .map(UtmParams::from_url)
                .unwrap_or_default(),
            location,
            now,
        })
        .await;

    Json(StartSessionResponse {
        session_id: visitor.session_id,
        visitor_id: visitor.visitor_id,
        is_new_visitor: visitor.is_new_visitor,
        visit_count: visitor.visit_count,
    })
}

/// POST /api/analytics/sessions/{id}/page-views
#[instrument(skip(state, body))]
pub async fn page_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PageViewRequest>,
) -> Result<StatusCode> {
    state
        .analytics()
        .track_page_view(id, &truncate(&body.path), &truncate(&body.title))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/analytics/sessions/{id}/cart-events
///
/// The product name falls back to the catalog name, then to the id.
#[instrument(skip(state, body))]
pub async fn cart_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CartEventRequest>,
) -> Result<StatusCode> {
    let name = body
        .product_name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| catalog::find(&body.product_id).map(|p| p.name.to_string()))
        .unwrap_or_else(|| body.product_id.clone());

    state
        .analytics()
        .track_cart_event(id, body.action, &body.product_id, &truncate(&name))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/analytics/sessions/{id}/contact
#[instrument(skip(state, body))]
pub async fn contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ContactInfo>,
) -> Result<StatusCode> {
    state.analytics().set_contact_info(id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/analytics/sessions/{id}/visibility
#[instrument(skip(state))]
pub async fn visibility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<VisibilityRequest>,
) -> Result<StatusCode> {
    state.analytics().set_visibility(id, body.visible).await?;
    Ok(StatusCode::NO_CONTENT)
}
