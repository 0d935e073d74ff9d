//! Wire types for the commerce platform API.
//!
//! Domain entities live in `sunrise-core`; this module holds the
//! request/response envelopes around them: paged results, creation drafts,
//! update actions, and error bodies.

use serde::{Deserialize, Serialize};
use sunrise_core::{LineItemId, LocalizedString, ProductId, VariantId};

// =============================================================================
// Paged Queries
// =============================================================================

/// One page of a paginated query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagedQueryResult<T> {
    /// Offset of the first result in this page.
    pub offset: u32,
    /// Number of results in this page.
    pub count: u32,
    /// Total number of results across all pages.
    pub total: u32,
    /// The results themselves.
    pub results: Vec<T>,
}

impl<T> PagedQueryResult<T> {
    /// Whether there is no page after this one.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        self.offset + self.count >= self.total
    }
}

/// Parameters for a product-projection search.
#[derive(Debug, Clone, Default)]
pub struct ProductSearchRequest {
    /// Full-text search term, if any.
    pub text: Option<String>,
    /// Sort expression understood by the platform (e.g. `"name.en asc"`).
    pub sort: Option<String>,
    /// Page size; the platform default applies when `None`.
    pub limit: Option<u32>,
    /// Page offset.
    pub offset: u32,
}

// =============================================================================
// Shopping Lists
// =============================================================================

/// Draft for creating a shopping-list container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListDraft {
    /// Localized list name.
    pub name: LocalizedString,
}

impl ShoppingListDraft {
    /// Draft a list with a single English name entry, the shape the wish-list
    /// container is created with.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: LocalizedString::from_single("en", name),
        }
    }
}

/// Update actions accepted by the shopping-list endpoint.
///
/// Serialized with the platform's `action` discriminator tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ShoppingListUpdateAction {
    /// Add a product (optionally a concrete variant) to the list.
    #[serde(rename_all = "camelCase")]
    AddLineItem {
        product_id: ProductId,
        #[serde(skip_serializing_if = "Option::is_none")]
        variant_id: Option<VariantId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        quantity: Option<u32>,
    },
    /// Remove a line item (entirely when `quantity` is absent).
    #[serde(rename_all = "camelCase")]
    RemoveLineItem {
        line_item_id: LineItemId,
        #[serde(skip_serializing_if = "Option::is_none")]
        quantity: Option<u32>,
    },
}

// =============================================================================
// Error Bodies
// =============================================================================

/// Error body returned by the platform on non-success responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// One entry of an error body's `errors` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    /// Present on concurrent-modification errors.
    #[serde(default)]
    pub current_version: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_detection() {
        let page = PagedQueryResult::<u8> {
            offset: 40,
            count: 10,
            total: 50,
            results: vec![],
        };
        assert!(page.is_last_page());

        let page = PagedQueryResult::<u8> {
            offset: 0,
            count: 20,
            total: 50,
            results: vec![],
        };
        assert!(!page.is_last_page());
    }

    #[test]
    fn test_add_line_item_serialization() {
        let action = ShoppingListUpdateAction::AddLineItem {
            product_id: ProductId::new("p1"),
            variant_id: Some(VariantId::new(2)),
            quantity: None,
        };
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "action": "addLineItem",
                "productId": "p1",
                "variantId": 2,
            })
        );
    }

    #[test]
    fn test_remove_line_item_serialization() {
        let action = ShoppingListUpdateAction::RemoveLineItem {
            line_item_id: LineItemId::new("li-1"),
            quantity: None,
        };
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "action": "removeLineItem",
                "lineItemId": "li-1",
            })
        );
    }

    #[test]
    fn test_error_body_parses_current_version() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"message": "conflict", "errors": [{"code": "ConcurrentModification", "currentVersion": 9}]}"#,
        )
        .expect("json");
        assert_eq!(body.errors.first().and_then(|e| e.current_version), Some(9));
    }
}
