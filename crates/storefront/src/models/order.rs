//! Order aggregate.
//!
//! An [`Order`] owns its [`OrderLine`]s. Each line keeps its parent's
//! [`OrderId`] as a plain value rather than a pointer back to the order, so the
//! aggregate stays a tree.
//!
//! Orders are created only by checkout (see
//! [`OrderMaterializer`](crate::services::orders::OrderMaterializer)) and are
//! never updated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use boutique_core::{CustomerId, OrderId, OrderLineId, Price, ProductId};

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Sum of the line totals captured at checkout.
    ///
    /// Never re-derived from the catalog, so later price changes do not alter
    /// historical orders.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(|line| line.line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// One product line of a persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    /// Back-reference to the owning order.
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at checkout × quantity.
    pub line_total: Price,
}

/// An order that has been built from a cart but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<NewOrderLine>,
}

impl NewOrder {
    /// Start an empty order for a customer, timestamped now.
    #[must_use]
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            created_at: Utc::now(),
            lines: Vec::new(),
        }
    }

    /// Append a line priced at `unit_price × quantity`.
    pub fn add_line(&mut self, product_id: ProductId, quantity: u32, unit_price: Price) {
        self.lines.push(NewOrderLine {
            product_id,
            quantity,
            line_total: unit_price.times(quantity),
        });
    }
}

/// A line of a [`NewOrder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub line_total: Price,
}

/// Units sold for one product, across every persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub total_quantity: u64,
}
