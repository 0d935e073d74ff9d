//! Ephemeral display context for price selection.

use serde::{Deserialize, Serialize};

use super::id::CustomerGroupId;

/// The context a price is selected for. Ephemeral input, never persisted.
///
/// All fields are optional: an anonymous browser in an unknown country still
/// gets the fallback price chain, just with fewer specific ranks available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayContext {
    /// ISO country code the customer is browsing from.
    pub country: Option<String>,
    /// ISO 4217 currency code to display prices in.
    pub currency: Option<String>,
    /// Customer group of the signed-in customer.
    pub customer_group_id: Option<CustomerGroupId>,
}

impl DisplayContext {
    /// Context for an anonymous session in a known country/currency.
    #[must_use]
    pub fn anonymous(country: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            currency: Some(currency.into()),
            customer_group_id: None,
        }
    }

    /// Attach a customer group to this context.
    #[must_use]
    pub fn with_customer_group(mut self, group: CustomerGroupId) -> Self {
        self.customer_group_id = Some(group);
        self
    }
}
