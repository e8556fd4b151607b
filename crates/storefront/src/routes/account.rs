//! Account route handlers.
//!
//! These routes require authentication.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use boutique_core::{OrderId, Price};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderLine};
use crate::services::orders::{OrderStore, find_customer_order};
use crate::state::AppState;

/// Order display data.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    pub total: Price,
    pub item_count: u64,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at,
            lines: order.lines.clone(),
            total: order.total(),
            item_count: order.item_count(),
        }
    }
}

/// Order history, newest first.
#[instrument(skip(state, customer), fields(customer_id = %customer.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state.orders().list_for_customer(customer.id).await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}

/// A single order. Orders of other customers are reported as missing.
#[instrument(skip(state, customer), fields(customer_id = %customer.id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let order = find_customer_order(&state.orders(), customer.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(OrderView::from(&order)))
}
