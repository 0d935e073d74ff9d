//! Commerce platform API client.
//!
//! # Architecture
//!
//! - The platform is the source of truth - no local sync, direct API calls
//! - Typed REST endpoints over `reqwest` with `serde` wire types
//! - OAuth2 client-credentials token flow, refreshed with a leeway
//! - In-memory caching via `moka` for product responses (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use sunrise_shop::commerce::PlatformClient;
//!
//! let client = PlatformClient::new(&config);
//!
//! // Fetch a product
//! let product = client.product_by_id(&"d32ee3".into()).await?;
//!
//! // Page through categories
//! let page = client.query_categories(500, 0).await?;
//! ```

mod auth;
mod client;
pub mod types;

pub use client::PlatformClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the commerce platform API.
///
/// Failures are values: services return them to the caller, which decides
/// what to show. An absent price is *not* an error (see
/// [`crate::services::pricing`]).
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A query returned zero results where one was expected.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A mutation quoted a stale version token.
    #[error("Version conflict{}", format_current_version(.current_version))]
    VersionConflict {
        /// The version the platform currently holds, when reported.
        current_version: Option<u64>,
    },

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Transport succeeded but the platform rejected the request.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the raw body when unparseable.
        message: String,
    },

    /// The token endpoint rejected the client credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The operation requires a signed-in customer session.
    #[error("Not authenticated")]
    NotAuthenticated,
}

fn format_current_version(current_version: &Option<u64>) -> String {
    current_version.map_or_else(String::new, |v| format!(" (current version {v})"))
}

impl ApiError {
    /// Whether retrying with a re-fetched version token can succeed.
    #[must_use]
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
