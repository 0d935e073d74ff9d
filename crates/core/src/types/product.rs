//! Catalog products and their variants.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariantId};
use super::localized::LocalizedString;
use super::price::Price;

/// A catalog entry as projected for the storefront.
///
/// Immutable once fetched; a re-query replaces the whole snapshot. The
/// platform splits the first variant out as `masterVariant`;
/// [`ProductProjection::all_variants`] restores the flat ordered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductProjection {
    /// Opaque product id.
    pub id: ProductId,
    /// Localized display name.
    pub name: LocalizedString,
    /// The distinguished first variant.
    pub master_variant: Variant,
    /// Remaining variants, in catalog order.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl ProductProjection {
    /// All variants in catalog order, master first.
    pub fn all_variants(&self) -> impl Iterator<Item = &Variant> {
        std::iter::once(&self.master_variant).chain(self.variants.iter())
    }

    /// Find a variant by id.
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.all_variants().find(|v| v.id == id)
    }
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Variant id, unique within the product.
    pub id: VariantId,
    /// Stock keeping unit, when assigned.
    #[serde(default)]
    pub sku: Option<String>,
    /// Display images, in catalog order.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Prices for this variant. Unordered beyond the backend's response
    /// order, which price selection treats as the tie-break.
    #[serde(default)]
    pub prices: Vec<Price>,
}

impl Variant {
    /// Whether the variant carries any price at all, in any scope.
    #[must_use]
    pub fn has_prices(&self) -> bool {
        !self.prices.is_empty()
    }
}

/// A variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Optional descriptive label.
    #[serde(default)]
    pub label: Option<String>,
}
