//! Order route handlers.
//!
//! Orders live in process memory; they are created by the checkout success
//! page or posted directly by the back office.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use noor_core::OrderStatus;

use crate::error::{AppError, Result};
use crate::services::Order;
use crate::services::orders::NewOrder;
use crate::services::slack::build_order_message;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub id: Option<String>,
    pub status: Option<String>,
}

/// Either one order (`?id=`) or a list.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OrdersResponse {
    One { order: Order },
    Many { orders: Vec<Order> },
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
}

/// GET /api/orders[?id=|?status=]
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<OrdersResponse>> {
    if let Some(id) = query.id.as_deref() {
        let order = state
            .orders()
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("order '{id}'")))?;
        return Ok(Json(OrdersResponse::One { order }));
    }

    let status = query
        .status
        .as_deref()
        .map(OrderStatus::from_str)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(OrdersResponse::Many {
        orders: state.orders().list(status),
    }))
}

/// POST /api/orders
#[instrument(skip(state, new_order))]
pub async fn create(
    State(state): State<AppState>,
    Json(new_order): Json<NewOrder>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let order = state.orders().create(new_order, Utc::now())?;

    if let Some(slack) = state.slack() {
        slack.post_in_background(format!("New order {}", order.id), build_order_message(&order));
    }

    Ok((StatusCode::CREATED, Json(OrderResponse { order })))
}

/// PATCH /api/orders
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let status =
        OrderStatus::from_str(&body.status).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let order = state
        .orders()
        .update_status(&body.id, status, Utc::now())?;
    Ok(Json(OrderResponse { order }))
}
