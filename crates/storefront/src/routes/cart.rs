//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every handler loads it once,
//! applies at most one change (which is written straight back), and answers
//! with JSON.

use axum::{Form, Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::{Price, ProductId};

use crate::cart::{CartEntry, CartError, CartManager};
use crate::db::CatalogRepository;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::routes::account::OrderView;
use crate::services::orders::OrderMaterializer;
use crate::state::AppState;

/// Shown when checkout is attempted with nothing in the cart.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty. No order was created.";

/// One cart line as shown to the visitor.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub label: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

impl From<&CartEntry> for CartItemView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            product_id: entry.product.id,
            label: entry.product.label.clone(),
            unit_price: entry.product.unit_price,
            quantity: entry.quantity,
            line_total: entry.line_total(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Price,
    /// Raw unit count, including products no longer in the catalog.
    pub item_count: u64,
}

impl CartView {
    fn new(entries: &[CartEntry], item_count: u64) -> Self {
        Self {
            items: entries.iter().map(CartItemView::from).collect(),
            total: entries.iter().map(CartEntry::line_total).sum(),
            item_count,
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Checkout outcome.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckoutResponse {
    Created { order: OrderView },
    Empty { message: &'static str },
}

/// Add or remove form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

impl QuantityForm {
    fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// Delete form data.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub product_id: ProductId,
}

// =============================================================================
// Helpers
// =============================================================================

type SessionCart<'a> = CartManager<Session, CatalogRepository<'a>>;

async fn load_cart(
    state: &AppState,
    session: Session,
) -> std::result::Result<SessionCart<'_>, CartError> {
    CartManager::load(session, state.catalog()).await
}

async fn view(cart: &SessionCart<'_>) -> Result<Json<CartView>> {
    let entries = cart.contents().await?;
    Ok(Json(CartView::new(&entries, cart.item_count())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&state, session).await?;
    view(&cart).await
}

/// Cart count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCount>> {
    let cart = load_cart(&state, session).await?;
    Ok(Json(CartCount {
        count: cart.item_count(),
    }))
}

/// Add units of a product.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<QuantityForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&state, session).await?;
    cart.add_product(form.product_id, form.quantity()).await?;
    view(&cart).await
}

/// Remove units of a product.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<QuantityForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&state, session).await?;
    cart.remove_product(form.product_id, form.quantity()).await?;
    view(&cart).await
}

/// Drop a product from the cart.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DeleteForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&state, session).await?;
    cart.delete_product(form.product_id).await?;
    view(&cart).await
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&state, session).await?;
    cart.clear().await?;
    view(&cart).await
}

/// Turn the cart into an order for the logged-in customer.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<CheckoutResponse>> {
    let mut cart = load_cart(&state, session).await?;
    let orders = state.orders();

    let response = match OrderMaterializer::new(&orders)
        .convert_cart_to_order(&mut cart, customer.id)
        .await?
    {
        Some(order) => {
            let order_id = order.id.to_string();
            add_breadcrumb(
                "checkout",
                "Order created",
                Some(&[("order_id", order_id.as_str())]),
            );
            CheckoutResponse::Created {
                order: OrderView::from(&order),
            }
        }
        None => CheckoutResponse::Empty {
            message: EMPTY_CART_MESSAGE,
        },
    };

    Ok(Json(response))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boutique_core::CategoryId;

    use super::*;
    use crate::models::Product;

    fn entry(id: i32, cents: i64, quantity: u32) -> CartEntry {
        CartEntry {
            product: Product {
                id: ProductId::new(id),
                label: format!("Product {id}"),
                description: String::new(),
                unit_price: Price::from_cents(cents),
                category_id: CategoryId::new(1),
            },
            quantity,
        }
    }

    #[test]
    fn test_cart_view_totals() {
        let entries = [entry(1, 1000, 2), entry(2, 500, 1)];

        let view = CartView::new(&entries, 4);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].line_total, Price::from_cents(2000));
        assert_eq!(view.total, Price::from_cents(2500));
        assert_eq!(view.item_count, 4);
    }

    #[test]
    fn test_empty_checkout_response_shape() {
        let json = serde_json::to_value(CheckoutResponse::Empty {
            message: EMPTY_CART_MESSAGE,
        })
        .unwrap();

        assert_eq!(json["status"], "empty");
        assert_eq!(json["message"], EMPTY_CART_MESSAGE);
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let form: QuantityForm = serde_json::from_str(r#"{"product_id": 4}"#).unwrap();
        assert_eq!(form.product_id, ProductId::new(4));
        assert_eq!(form.quantity(), 1);
    }
}
