//! Customer wish lists (shopping-list containers).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{LineItemId, ProductId, ShoppingListId, VariantId};
use super::localized::LocalizedString;
use super::product::Variant;

/// A named shopping-list container owned by the customer session.
///
/// The `version` is the optimistic-concurrency token; every update must quote
/// the current value or the platform rejects the mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    /// Opaque list id.
    pub id: ShoppingListId,
    /// Optimistic-concurrency token.
    pub version: u64,
    /// Localized list name.
    pub name: LocalizedString,
    /// Line items, in server order.
    #[serde(default)]
    pub line_items: Vec<ShoppingListLineItem>,
}

impl ShoppingList {
    /// Find a line item by `(product, variant)` pair. `None` variant matches
    /// `None` only ("any variant" entries are distinct from concrete ones).
    #[must_use]
    pub fn find_line_item(
        &self,
        product_id: &ProductId,
        variant_id: Option<VariantId>,
    ) -> Option<&ShoppingListLineItem> {
        self.line_items
            .iter()
            .find(|item| item.matches(product_id, variant_id))
    }
}

/// One wish-listed product+variant pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListLineItem {
    /// Server-assigned id; the empty-string placeholder for optimistic
    /// entries not yet confirmed.
    pub id: LineItemId,
    /// Product this entry points at.
    pub product_id: ProductId,
    /// Concrete variant, or `None` for "any variant" / master.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Denormalized variant snapshot for display.
    #[serde(default)]
    pub variant: Option<Variant>,
    /// When the entry was added. Server-assigned; synthesized as `Utc::now()`
    /// for optimistic entries.
    pub added_at: DateTime<Utc>,
}

impl ShoppingListLineItem {
    /// Synthesize an optimistic entry for a not-yet-confirmed add.
    #[must_use]
    pub fn optimistic(product_id: ProductId, variant_id: Option<VariantId>) -> Self {
        Self {
            id: LineItemId::placeholder(),
            product_id,
            variant_id,
            variant: None,
            added_at: Utc::now(),
        }
    }

    /// Whether this entry is for the given `(product, variant)` pair.
    #[must_use]
    pub fn matches(&self, product_id: &ProductId, variant_id: Option<VariantId>) -> bool {
        self.product_id == *product_id && self.variant_id == variant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: &str, variant: Option<i32>) -> ShoppingListLineItem {
        ShoppingListLineItem::optimistic(ProductId::new(product), variant.map(VariantId::new))
    }

    #[test]
    fn test_matches_requires_exact_variant() {
        let concrete = item("p1", Some(1));
        assert!(concrete.matches(&ProductId::new("p1"), Some(VariantId::new(1))));
        assert!(!concrete.matches(&ProductId::new("p1"), None));
        assert!(!concrete.matches(&ProductId::new("p1"), Some(VariantId::new(2))));

        let any = item("p1", None);
        assert!(any.matches(&ProductId::new("p1"), None));
        assert!(!any.matches(&ProductId::new("p1"), Some(VariantId::new(1))));
    }

    #[test]
    fn test_find_line_item() {
        let list = ShoppingList {
            id: ShoppingListId::new("wl"),
            version: 1,
            name: LocalizedString::from_single("en", "WishList"),
            line_items: vec![item("p1", Some(1)), item("p2", None)],
        };

        assert!(list.find_line_item(&ProductId::new("p2"), None).is_some());
        assert!(list.find_line_item(&ProductId::new("p2"), Some(VariantId::new(1))).is_none());
    }

    #[test]
    fn test_optimistic_entry_uses_placeholder_id() {
        assert!(item("p1", None).id.is_placeholder());
    }
}
