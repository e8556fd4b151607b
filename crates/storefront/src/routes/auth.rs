//! Authentication route handlers.
//!
//! Registration and login store the customer in the session; the visitor's
//! cart is kept across both.

use axum::{Form, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, Customer};
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// Handlers
// =============================================================================

async fn start_session(session: &Session, customer: &Customer) -> Result<()> {
    set_current_customer(session, &CurrentCustomer::from(customer)).await?;
    set_sentry_user(&customer.id, Some(customer.email.as_str()));
    Ok(())
}

/// Register a new customer and log them in.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<Customer>)> {
    let customer = AuthService::new(state.pool())
        .register(&form.email, &form.password, &form.first_name, &form.last_name)
        .await?;

    start_session(&session, &customer).await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// Log in with email and password.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Json<Customer>> {
    let customer = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "login rejected"))?;

    start_session(&session, &customer).await?;
    tracing::info!(customer_id = %customer.id, "customer logged in");

    Ok(Json(customer))
}

/// Log out. The cart stays in the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_customer(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
