//! Navigation categories.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;
use super::localized::LocalizedString;

/// A navigation category.
///
/// Categories arrive as a flat list and form a tree through the `parent`
/// reference; `external_id` lets configuration pin the navigation root to a
/// subtree without a separate admin flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Opaque category id.
    pub id: CategoryId,
    /// Localized display name.
    pub name: LocalizedString,
    /// Parent category, absent for roots.
    #[serde(default)]
    pub parent: Option<CategoryReference>,
    /// External identifier from the merchant's own systems.
    #[serde(default)]
    pub external_id: Option<String>,
}

impl Category {
    /// Id of the parent category, if any.
    #[must_use]
    pub fn parent_id(&self) -> Option<&CategoryId> {
        self.parent.as_ref().map(|p| &p.id)
    }

    /// Whether this category has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A by-id reference to another category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReference {
    /// Referenced category id.
    pub id: CategoryId,
}
