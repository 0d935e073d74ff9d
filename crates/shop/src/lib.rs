//! Sunrise shop library.
//!
//! Client-side core of the Sunrise shopping application: the commerce
//! platform HTTP client plus the three shopping services built on it.
//!
//! # Modules
//!
//! - [`commerce`] - Typed HTTP client for the commerce platform API
//! - [`services::pricing`] - Context-aware price and display-variant selection
//! - [`services::wishlist`] - Wish-list synchronization with optimistic updates
//! - [`services::navigation`] - Category tree flattening and active-path diffs
//! - [`config`] - Environment-driven configuration
//! - [`state`] - Explicitly constructed service container

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commerce;
pub mod config;
pub mod services;
pub mod state;
