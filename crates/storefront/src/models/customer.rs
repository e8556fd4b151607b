//! Customer domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use boutique_core::{CustomerId, Email};

/// A registered boutique customer.
///
/// The password hash is stored separately and never loaded into this type.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Login email address.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
