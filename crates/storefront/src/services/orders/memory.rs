//! In-process order store.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use boutique_core::{CustomerId, OrderId, OrderLineId, ProductId};

use super::OrderStore;
use crate::db::RepositoryError;
use crate::models::{NewOrder, Order, OrderLine, ProductSales};

/// Orders held in memory. Clones share the same orders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Ledger>>,
}

#[derive(Debug, Default)]
struct Ledger {
    last_order_id: i32,
    last_line_id: i32,
    orders: BTreeMap<OrderId, Order>,
}

impl InMemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    async fn save(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut ledger = self.inner.write().await;

        ledger.last_order_id += 1;
        let id = OrderId::new(ledger.last_order_id);

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            ledger.last_line_id += 1;
            lines.push(OrderLine {
                id: OrderLineId::new(ledger.last_line_id),
                order_id: id,
                product_id: line.product_id,
                quantity: line.quantity,
                line_total: line.line_total,
            });
        }

        let saved = Order {
            id,
            customer_id: order.customer_id,
            created_at: order.created_at,
            lines,
        };
        ledger.orders.insert(id, saved.clone());
        Ok(saved)
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn list_for_customer(&self, customer: CustomerId) -> Result<Vec<Order>, RepositoryError> {
        let ledger = self.inner.read().await;
        let mut orders: Vec<Order> = ledger
            .orders
            .values()
            .filter(|o| o.customer_id == customer)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn top_sellers(&self, limit: u32) -> Result<Vec<ProductSales>, RepositoryError> {
        let ledger = self.inner.read().await;

        let mut totals: BTreeMap<ProductId, u64> = BTreeMap::new();
        for line in ledger.orders.values().flat_map(|o| &o.lines) {
            *totals.entry(line.product_id).or_default() += u64::from(line.quantity);
        }

        let mut sales: Vec<ProductSales> = totals
            .into_iter()
            .map(|(product_id, total_quantity)| ProductSales {
                product_id,
                total_quantity,
            })
            .collect();
        sales.sort_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then(a.product_id.cmp(&b.product_id))
        });
        sales.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(sales)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boutique_core::Price;

    use super::*;

    fn draft(customer: i32, lines: &[(i32, u32)]) -> NewOrder {
        let mut order = NewOrder::new(CustomerId::new(customer));
        for &(product, qty) in lines {
            order.add_line(ProductId::new(product), qty, Price::from_cents(100));
        }
        order
    }

    #[tokio::test]
    async fn test_save_assigns_ids() {
        let store = InMemoryOrderStore::new();

        let first = store.save(&draft(1, &[(1, 1), (2, 2)])).await.unwrap();
        let second = store.save(&draft(1, &[(3, 1)])).await.unwrap();

        assert_eq!(first.id, OrderId::new(1));
        assert_eq!(second.id, OrderId::new(2));
        assert_eq!(first.lines[1].id, OrderLineId::new(2));
        assert_eq!(second.lines[0].id, OrderLineId::new(3));
        assert_eq!(second.lines[0].order_id, second.id);
    }

    #[tokio::test]
    async fn test_clones_share_orders() {
        let store = InMemoryOrderStore::new();
        let other = store.clone();

        let order = store.save(&draft(1, &[(1, 1)])).await.unwrap();

        assert_eq!(other.find(order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_list_for_customer_newest_first() {
        let store = InMemoryOrderStore::new();
        let older = store.save(&draft(1, &[(1, 1)])).await.unwrap();
        store.save(&draft(2, &[(1, 1)])).await.unwrap();
        let newer = store.save(&draft(1, &[(2, 1)])).await.unwrap();

        let ids: Vec<_> = store
            .list_for_customer(CustomerId::new(1))
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();

        assert_eq!(ids, [newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_top_sellers_ranked_and_limited() {
        let store = InMemoryOrderStore::new();
        store.save(&draft(1, &[(1, 2), (2, 1)])).await.unwrap();
        store.save(&draft(2, &[(2, 1), (3, 5)])).await.unwrap();

        let sales = store.top_sellers(2).await.unwrap();
        let ranked: Vec<_> = sales
            .iter()
            .map(|s| (s.product_id.as_i32(), s.total_quantity))
            .collect();

        // Products 1 and 2 tie on 2 units; the lower ID wins.
        assert_eq!(ranked, [(3, 5), (1, 2)]);
    }
}
