//! Sunrise configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUNRISE_API_URL` - Base URL of the commerce platform API
//! - `SUNRISE_AUTH_URL` - Base URL of the platform's OAuth token endpoint
//! - `SUNRISE_PROJECT_KEY` - Project key scoping every API path
//! - `SUNRISE_CLIENT_ID` - API client id
//! - `SUNRISE_CLIENT_SECRET` - API client secret
//!
//! ## Optional
//! - `SUNRISE_LOCALE` - Display locale (default: en)
//! - `SUNRISE_COUNTRY` - ISO country code for price selection
//! - `SUNRISE_CURRENCY` - ISO 4217 currency code for price selection
//! - `SUNRISE_NAVIGATION_EXTERNAL_ID` - External id pinning the navigation
//!   root to a category subtree

use secrecy::SecretString;
use sunrise_core::DisplayContext;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Sunrise application configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct SunriseConfig {
    /// Base URL of the commerce platform API
    pub api_url: Url,
    /// Base URL of the OAuth token endpoint
    pub auth_url: Url,
    /// Project key scoping every API path
    pub project_key: String,
    /// API client id
    pub client_id: String,
    /// API client secret
    pub client_secret: SecretString,
    /// Display locale for localized strings
    pub locale: String,
    /// Country the shop presents prices for
    pub country: Option<String>,
    /// Currency the shop presents prices in
    pub currency: Option<String>,
    /// External id of the category whose children become the navigation roots
    pub navigation_external_id: Option<String>,
}

impl std::fmt::Debug for SunriseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SunriseConfig")
            .field("api_url", &self.api_url.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .field("project_key", &self.project_key)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("locale", &self.locale)
            .field("country", &self.country)
            .field("currency", &self.currency)
            .field("navigation_external_id", &self.navigation_external_id)
            .finish()
    }
}

impl SunriseConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_url: get_url("SUNRISE_API_URL")?,
            auth_url: get_url("SUNRISE_AUTH_URL")?,
            project_key: get_required_env("SUNRISE_PROJECT_KEY")?,
            client_id: get_required_env("SUNRISE_CLIENT_ID")?,
            client_secret: SecretString::from(get_required_env("SUNRISE_CLIENT_SECRET")?),
            locale: get_env_or_default("SUNRISE_LOCALE", "en"),
            country: get_optional_env("SUNRISE_COUNTRY"),
            currency: get_optional_env("SUNRISE_CURRENCY"),
            navigation_external_id: get_optional_env("SUNRISE_NAVIGATION_EXTERNAL_ID"),
        })
    }

    /// The price-selection context for an anonymous session under this
    /// configuration. A signed-in customer's group is attached by the caller.
    #[must_use]
    pub fn display_context(&self) -> DisplayContext {
        DisplayContext {
            country: self.country.clone(),
            currency: self.currency.clone(),
            customer_group_id: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as absent.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default fallback.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required environment variable parsed as a URL.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
