//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use boutique_core::{CategoryId, ProductId};

use crate::catalog::CatalogLookup;
use crate::error::{AppError, Result};
use crate::models::{Category, Product};
use crate::services::orders::{TopSeller, top_sellers};
use crate::state::AppState;

/// All categories, by name.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().categories().await?))
}

/// Products of one category.
#[instrument(skip(state))]
pub async fn category_products(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().find_by_category(id).await?))
}

/// Products whose label or description contains the term.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().search(&term).await?))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .catalog()
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Best-selling products.
#[instrument(skip(state))]
pub async fn best_sellers(State(state): State<AppState>) -> Result<Json<Vec<TopSeller>>> {
    let sellers = top_sellers(
        &state.orders(),
        &state.catalog(),
        state.config().top_sellers_limit,
    )
    .await?;
    Ok(Json(sellers))
}
