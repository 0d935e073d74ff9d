//! Catalog prices with scope and validity windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ChannelId, CustomerGroupId};
use super::money::Money;

/// A price attached to a product variant.
///
/// Every scope field is optional: the more of them are set, the more specific
/// the price. A price with none of them (and no validity window) is
/// "independent" and serves as the last-resort fallback during selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// The base amount.
    pub value: Money,
    /// ISO country code this price is scoped to.
    #[serde(default)]
    pub country: Option<String>,
    /// Customer group this price is scoped to.
    #[serde(default)]
    pub customer_group_id: Option<CustomerGroupId>,
    /// Distribution channel this price is scoped to.
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// Start of the validity window.
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity window.
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    /// Discounted amount, when a product discount applies.
    #[serde(default)]
    pub discounted: Option<DiscountedPrice>,
}

/// The discounted amount of a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountedPrice {
    /// The reduced amount.
    pub value: Money,
}

impl Price {
    /// A context-free price used for basic fixtures and optimistic entries.
    #[must_use]
    pub fn independent(value: Money) -> Self {
        Self {
            value,
            country: None,
            customer_group_id: None,
            channel_id: None,
            valid_from: None,
            valid_until: None,
            discounted: None,
        }
    }

    /// Whether both validity bounds are set and `now` falls strictly between
    /// them. A price with an open-ended window is never "time-bound valid";
    /// the bounds themselves are exclusive.
    #[must_use]
    pub fn is_time_bound_and_valid_at(&self, now: DateTime<Utc>) -> bool {
        matches!(
            (self.valid_from, self.valid_until),
            (Some(from), Some(until)) if from < now && now < until
        )
    }

    /// Whether the price carries no scope and no validity window at all.
    #[must_use]
    pub const fn is_independent(&self) -> bool {
        self.country.is_none()
            && self.customer_group_id.is_none()
            && self.channel_id.is_none()
            && self.valid_from.is_none()
            && self.valid_until.is_none()
    }

    /// The effective amount: the discounted value when present, the base
    /// value otherwise.
    #[must_use]
    pub fn effective_value(&self) -> &Money {
        self.discounted.as_ref().map_or(&self.value, |d| &d.value)
    }

    /// Discount in minor units; zero when no discount applies.
    #[must_use]
    pub fn discount_cents(&self) -> i64 {
        self.discounted
            .as_ref()
            .map_or(0, |d| self.value.cent_amount - d.value.cent_amount)
    }
}
