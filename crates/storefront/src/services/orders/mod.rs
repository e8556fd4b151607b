//! Checkout and order queries.
//!
//! [`OrderMaterializer`] turns the visitor's cart into a persisted [`Order`]
//! for a logged-in customer, then empties the cart. The order and its lines
//! are saved as one unit by the [`OrderStore`]; if saving fails, the cart is
//! left exactly as it was.

mod memory;

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use boutique_core::{CustomerId, OrderId};

use crate::cart::{CartError, CartManager, CartStore};
use crate::catalog::CatalogLookup;
use crate::db::RepositoryError;
use crate::models::{NewOrder, Order, Product, ProductSales};

pub use memory::InMemoryOrderStore;

/// Durable storage for orders.
pub trait OrderStore: Send + Sync {
    /// Persist an order and all of its lines atomically.
    ///
    /// Either every row is written and the stored order (with assigned IDs) is
    /// returned, or nothing is written and an error is returned.
    fn save(&self, order: &NewOrder)
    -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Find an order by ID.
    fn find(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// All orders of a customer, newest first.
    fn list_for_customer(
        &self,
        customer: CustomerId,
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// Units sold per product across all orders, best sellers first.
    fn top_sellers(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ProductSales>, RepositoryError>> + Send;
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart could not be resolved against the catalog.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// The order could not be saved. Nothing was written.
    #[error("failed to persist order: {0}")]
    Persistence(#[source] RepositoryError),
}

/// Converts carts into orders.
pub struct OrderMaterializer<'a, O> {
    orders: &'a O,
}

impl<'a, O: OrderStore> OrderMaterializer<'a, O> {
    /// Create a materializer writing to `orders`.
    #[must_use]
    pub const fn new(orders: &'a O) -> Self {
        Self { orders }
    }

    /// Turn the cart into an order for `customer_id` and empty the cart.
    ///
    /// Returns `Ok(None)` without touching the cart if the cart is empty.
    ///
    /// Each cart entry becomes one order line priced at the catalog's current
    /// unit price. Entries whose product is gone from the catalog are skipped;
    /// if none resolve, an order with no lines is still saved.
    ///
    /// The cart is emptied only once the order is saved. If the emptied cart
    /// cannot be written back to the session, the failure is logged and the
    /// saved order is still returned.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Cart` if the catalog lookup fails, and
    /// `CheckoutError::Persistence` if the order cannot be saved. In both
    /// cases the cart is unchanged.
    #[instrument(skip(self, cart))]
    pub async fn convert_cart_to_order<S, C>(
        &self,
        cart: &mut CartManager<S, C>,
        customer_id: CustomerId,
    ) -> Result<Option<Order>, CheckoutError>
    where
        S: CartStore,
        C: CatalogLookup,
    {
        if cart.is_empty() {
            tracing::debug!("cart is empty, no order created");
            return Ok(None);
        }

        let mut draft = NewOrder::new(customer_id);
        for entry in cart.contents().await? {
            draft.add_line(entry.product.id, entry.quantity, entry.product.unit_price);
        }
        let skipped = cart.cart().len().saturating_sub(draft.lines.len());

        let order = self
            .orders
            .save(&draft)
            .await
            .map_err(CheckoutError::Persistence)?;

        if let Err(e) = cart.clear().await {
            tracing::error!(
                order_id = %order.id,
                error = %e,
                "order saved but cart could not be cleared"
            );
        }

        tracing::info!(
            order_id = %order.id,
            lines = order.lines.len(),
            skipped,
            total = %order.total(),
            "order created"
        );

        Ok(Some(order))
    }
}

/// A best-selling product and the units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopSeller {
    pub product: Product,
    pub total_quantity: u64,
}

/// The best-selling products that are still in the catalog.
///
/// # Errors
///
/// Returns `RepositoryError` if either store fails.
pub async fn top_sellers<O, C>(
    orders: &O,
    catalog: &C,
    limit: u32,
) -> Result<Vec<TopSeller>, RepositoryError>
where
    O: OrderStore,
    C: CatalogLookup,
{
    let sales = orders.top_sellers(limit).await?;
    let mut sellers = Vec::with_capacity(sales.len());
    for sale in sales {
        if let Some(product) = catalog.find_by_id(sale.product_id).await? {
            sellers.push(TopSeller {
                product,
                total_quantity: sale.total_quantity,
            });
        }
    }
    Ok(sellers)
}

/// Find an order only if it belongs to `customer`.
///
/// # Errors
///
/// Returns `RepositoryError` if the store fails.
pub async fn find_customer_order<O: OrderStore>(
    orders: &O,
    customer: CustomerId,
    id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    Ok(orders
        .find(id)
        .await?
        .filter(|order| order.customer_id == customer))
}
