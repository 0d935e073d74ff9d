//! Core types for Sunrise.
//!
//! This module provides the domain model fetched from the commerce platform.

pub mod category;
pub mod context;
pub mod id;
pub mod localized;
pub mod money;
pub mod price;
pub mod product;
pub mod wishlist;

pub use category::{Category, CategoryReference};
pub use context::DisplayContext;
pub use id::*;
pub use localized::LocalizedString;
pub use money::Money;
pub use price::{DiscountedPrice, Price};
pub use product::{Image, ProductProjection, Variant};
pub use wishlist::{ShoppingList, ShoppingListLineItem};
