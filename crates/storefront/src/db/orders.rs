//! Order repository for database operations.
//!
//! An order and its lines are written inside one transaction; dropping the
//! transaction on any early return rolls every insert back.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use boutique_core::{CustomerId, OrderId, OrderLineId, Price, ProductId};

use super::{RepositoryError, quantity_from_db, quantity_to_db};
use crate::models::{NewOrder, Order, OrderLine, ProductSales};
use crate::services::orders::OrderStore;

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: OrderLineId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    line_total: Price,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: quantity_from_db(row.quantity)?,
            line_total: row.line_total,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SalesRow {
    product_id: ProductId,
    total_quantity: i64,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Attach lines to their orders, keeping the orders' sequence.
    fn assemble(
        orders: Vec<OrderRow>,
        lines: Vec<OrderLineRow>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut by_order: BTreeMap<OrderId, Vec<OrderLine>> = BTreeMap::new();
        for row in lines {
            let line = OrderLine::try_from(row)?;
            by_order.entry(line.order_id).or_default().push(line);
        }

        Ok(orders
            .into_iter()
            .map(|o| Order {
                id: o.id,
                customer_id: o.customer_id,
                created_at: o.created_at,
                lines: by_order.remove(&o.id).unwrap_or_default(),
            })
            .collect())
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn save(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO boutique.customer_order (customer_id, created_at)
            VALUES ($1, $2)
            RETURNING id, customer_id, created_at
            ",
        )
        .bind(order.customer_id)
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let line_row = sqlx::query_as::<_, OrderLineRow>(
                r"
                INSERT INTO boutique.order_line (order_id, product_id, quantity, line_total)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, product_id, quantity, line_total
                ",
            )
            .bind(row.id)
            .bind(line.product_id)
            .bind(quantity_to_db(line.quantity)?)
            .bind(line.line_total)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(OrderLine::try_from(line_row)?);
        }

        tx.commit().await?;

        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            created_at: row.created_at,
            lines,
        })
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, created_at
            FROM boutique.customer_order
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT id, order_id, product_id, quantity, line_total
            FROM boutique.order_line
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Self::assemble(vec![row], lines)?.into_iter().next())
    }

    async fn list_for_customer(&self, customer: CustomerId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, created_at
            FROM boutique.customer_order
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT l.id, l.order_id, l.product_id, l.quantity, l.line_total
            FROM boutique.order_line l
            JOIN boutique.customer_order o ON o.id = l.order_id
            WHERE o.customer_id = $1
            ORDER BY l.id
            ",
        )
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        Self::assemble(orders, lines)
    }

    async fn top_sellers(&self, limit: u32) -> Result<Vec<ProductSales>, RepositoryError> {
        let rows = sqlx::query_as::<_, SalesRow>(
            r#"
            SELECT product_id, SUM(quantity)::BIGINT AS "total_quantity"
            FROM boutique.order_line
            GROUP BY product_id
            ORDER BY total_quantity DESC, product_id
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let total_quantity = u64::try_from(r.total_quantity).map_err(|_| {
                    RepositoryError::DataCorruption(format!(
                        "negative sales total for product {}",
                        r.product_id
                    ))
                })?;
                Ok(ProductSales {
                    product_id: r.product_id,
                    total_quantity,
                })
            })
            .collect()
    }
}
