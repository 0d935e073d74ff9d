//! Sunrise Core - Shared domain types.
//!
//! This crate provides the domain model shared by all Sunrise components:
//! - `shop` - Commerce platform client and the catalog/wish-list/navigation services
//! - `integration-tests` - Cross-component scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types plus the [`observable`] state primitive -
//! no I/O, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Ids, money, localized strings, products, categories, shopping lists
//! - [`observable`] - Push-based observable state with synchronous notification

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod observable;
pub mod types;

pub use observable::{Observable, Subscription};
pub use types::*;
