//! Wishlist route handlers.

use axum::Json;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use noor_core::WishlistItem;

use crate::catalog;
use crate::error::{AppError, Result};
use crate::services::WishlistStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub items: Vec<WishlistItem>,
    pub count: usize,
}

impl WishlistView {
    fn new(wishlist: &WishlistStore<Session>) -> Self {
        Self {
            items: wishlist.items().to_vec(),
            count: wishlist.items().len(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: String,
}

/// GET /api/wishlist
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<WishlistView> {
    let wishlist = WishlistStore::load(session).await;
    Json(WishlistView::new(&wishlist))
}

/// POST /api/wishlist/add
#[instrument(skip(session))]
pub async fn add(
    session: Session,
    Json(body): Json<WishlistRequest>,
) -> Result<Json<WishlistView>> {
    let product = catalog::find(&body.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product '{}'", body.product_id)))?;

    let mut wishlist = WishlistStore::load(session).await;
    wishlist.add_item(product.wishlist_item()).await;
    Ok(Json(WishlistView::new(&wishlist)))
}

/// POST /api/wishlist/remove
#[instrument(skip(session))]
pub async fn remove(session: Session, Json(body): Json<WishlistRequest>) -> Json<WishlistView> {
    let mut wishlist = WishlistStore::load(session).await;
    wishlist.remove_item(&body.product_id).await;
    Json(WishlistView::new(&wishlist))
}

/// POST /api/wishlist/clear
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Json<WishlistView> {
    let mut wishlist = WishlistStore::load(session).await;
    wishlist.clear_wishlist().await;
    Json(WishlistView::new(&wishlist))
}
