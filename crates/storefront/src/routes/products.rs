//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use noor_core::{Currency, CurrencyCode};

use super::currency::selected_currency;
use crate::catalog::{self, Category, Product};
use crate::error::{AppError, Result};
use crate::services::WishlistStore;

/// Product with prices in base and display currency.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: &'static Product,
    pub price: Decimal,
    pub display_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_wishlist: Option<bool>,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &'static Product, currency: CurrencyCode) -> Self {
        Self {
            product,
            price: product.price(),
            display_price: Currency::get(currency).format(product.price()),
            in_wishlist: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductView>,
    pub currency: CurrencyCode,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

/// GET /api/products
#[instrument(skip(session))]
pub async fn index(
    session: Session,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListResponse>> {
    let currency = selected_currency(&session).await;

    let products: Vec<&'static Product> = match query.category.as_deref() {
        Some(slug) => {
            let category = Category::from_slug(slug)
                .ok_or_else(|| AppError::NotFound(format!("category '{slug}'")))?;
            catalog::by_category(category).collect()
        }
        None => catalog::all().iter().collect(),
    };

    Ok(Json(ProductListResponse {
        products: products
            .into_iter()
            .map(|p| ProductView::new(p, currency))
            .collect(),
        currency,
    }))
}

/// GET /api/products/{id}
#[instrument(skip(session))]
pub async fn show(session: Session, Path(id): Path<String>) -> Result<Json<ProductView>> {
    let product =
        catalog::find(&id).ok_or_else(|| AppError::NotFound(format!("product '{id}'")))?;
    let currency = selected_currency(&session).await;
    let wishlist = WishlistStore::load(session).await;

    Ok(Json(ProductView {
        in_wishlist: Some(wishlist.is_in_wishlist(product.id)),
        ..ProductView::new(product, currency)
    }))
}
