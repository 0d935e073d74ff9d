//! Commerce platform API client implementation.
//!
//! Typed REST calls over `reqwest`, project-key scoped paths, bearer tokens
//! from the client-credentials flow, and a `moka` cache for product responses
//! (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sunrise_core::{
    Category, DisplayContext, ProductId, ProductProjection, ShoppingList, ShoppingListId,
};
use tracing::{debug, instrument};
use url::Url;

use crate::config::SunriseConfig;
use crate::services::navigation::CategoryApi;
use crate::services::wishlist::ShoppingListApi;

use super::ApiError;
use super::auth::{self, AccessToken, ClientCredentials};
use super::types::{
    ErrorBody, PagedQueryResult, ProductSearchRequest, ShoppingListDraft, ShoppingListUpdateAction,
};

/// Client for the commerce platform API.
///
/// Cheap to clone; all clones share the HTTP connection pool, the token and
/// the response cache.
#[derive(Clone)]
pub struct PlatformClient {
    inner: Arc<PlatformClientInner>,
}

struct PlatformClientInner {
    http: reqwest::Client,
    /// `{api_url}/{project_key}`, no trailing slash.
    base_url: String,
    auth_url: Url,
    project_key: String,
    credentials: ClientCredentials,
    token: tokio::sync::Mutex<Option<AccessToken>>,
    product_cache: Cache<String, ProductProjection>,
}

impl PlatformClient {
    /// Create a new platform client.
    #[must_use]
    pub fn new(config: &SunriseConfig) -> Self {
        let product_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let base_url = format!(
            "{}/{}",
            config.api_url.as_str().trim_end_matches('/'),
            config.project_key
        );

        Self {
            inner: Arc::new(PlatformClientInner {
                http: reqwest::Client::new(),
                base_url,
                auth_url: config.auth_url.clone(),
                project_key: config.project_key.clone(),
                credentials: ClientCredentials {
                    client_id: config.client_id.clone(),
                    client_secret: config.client_secret.clone(),
                },
                token: tokio::sync::Mutex::new(None),
                product_cache,
            }),
        }
    }

    /// Current bearer token, refreshing it when expired.
    async fn bearer_token(&self) -> Result<SecretString, ApiError> {
        let mut guard = self.inner.token.lock().await;

        if let Some(token) = guard.as_ref()
            && !token.is_expired()
        {
            return Ok(token.access_token.clone());
        }

        debug!("access token missing or expiring, re-authenticating");
        let fresh = auth::authenticate(
            &self.inner.http,
            &self.inner.auth_url,
            &self.inner.project_key,
            &self.inner.credentials,
        )
        .await?;
        let value = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    /// Execute a GET request against a project-scoped path.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let token = self.bearer_token().await?;
        let request = self
            .inner
            .http
            .get(format!("{}/{path}", self.inner.base_url))
            .bearer_auth(token.expose_secret())
            .query(query);
        Self::send(request).await
    }

    /// Execute a POST request against a project-scoped path.
    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let token = self.bearer_token().await?;
        let request = self
            .inner
            .http
            .post(format!("{}/{path}", self.inner.base_url))
            .bearer_auth(token.expose_secret())
            .json(body);
        Self::send(request).await
    }

    /// Send a prepared request and map the response to a typed result.
    async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_str(&response_text).unwrap_or_default();
            let message = body
                .message
                .unwrap_or_else(|| response_text.chars().take(200).collect());

            tracing::error!(
                status = %status,
                message = %message,
                "Platform API returned non-success status"
            );

            return Err(match status {
                reqwest::StatusCode::NOT_FOUND => ApiError::NotFound(message),
                reqwest::StatusCode::CONFLICT => ApiError::VersionConflict {
                    current_version: body
                        .errors
                        .iter()
                        .filter(|detail| detail.code.as_deref() == Some("ConcurrentModification"))
                        .find_map(|detail| detail.current_version),
                },
                _ => ApiError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse platform API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product projection by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the product does not exist, or the
    /// transport/API error otherwise.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn product_by_id(&self, id: &ProductId) -> Result<ProductProjection, ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(product) = self.inner.product_cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: ProductProjection = self
            .get_json(&format!("product-projections/{id}"), &[])
            .await?;

        self.inner
            .product_cache
            .insert(cache_key, product.clone())
            .await;

        Ok(product)
    }

    /// Search product projections.
    ///
    /// The display context is forwarded as price-selection parameters so the
    /// platform scopes embedded prices the same way the client-side resolver
    /// does.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request, context))]
    pub async fn search_products(
        &self,
        request: &ProductSearchRequest,
        context: &DisplayContext,
    ) -> Result<PagedQueryResult<ProductProjection>, ApiError> {
        let mut query: Vec<(&str, String)> = vec![("offset", request.offset.to_string())];
        if let Some(text) = &request.text {
            query.push(("text.en", text.clone()));
        }
        if let Some(sort) = &request.sort {
            query.push(("sort", sort.clone()));
        }
        if let Some(limit) = request.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(country) = &context.country {
            query.push(("priceCountry", country.clone()));
        }
        if let Some(currency) = &context.currency {
            query.push(("priceCurrency", currency.clone()));
        }
        if let Some(group) = &context.customer_group_id {
            query.push(("priceCustomerGroup", group.to_string()));
        }

        self.get_json("product-projections/search", &query).await
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get one page of categories. Callers loop until
    /// [`PagedQueryResult::is_last_page`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn query_categories(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<PagedQueryResult<Category>, ApiError> {
        self.get_json(
            "categories",
            &[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("sort", "orderHint asc".to_string()),
            ],
        )
        .await
    }

    // =========================================================================
    // Shopping List Methods
    // =========================================================================

    /// Query the customer's shopping lists by exact name, most recently
    /// modified first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn query_shopping_lists(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<ShoppingList>, ApiError> {
        let page: PagedQueryResult<ShoppingList> = self
            .get_json(
                "me/shopping-lists",
                &[
                    ("where", format!("name(en=\"{name}\")")),
                    ("sort", "lastModifiedAt desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(page.results)
    }

    /// Create a shopping list from a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, draft))]
    pub async fn create_shopping_list(
        &self,
        draft: &ShoppingListDraft,
    ) -> Result<ShoppingList, ApiError> {
        self.post_json("me/shopping-lists", draft).await
    }

    /// Apply update actions to a shopping list at a given version.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::VersionConflict` when `version` is stale, or the
    /// transport/API error otherwise.
    #[instrument(skip(self, actions), fields(id = %id, version = version))]
    pub async fn update_shopping_list(
        &self,
        id: &ShoppingListId,
        version: u64,
        actions: &[ShoppingListUpdateAction],
    ) -> Result<ShoppingList, ApiError> {
        #[derive(Serialize)]
        struct UpdateRequest<'a> {
            version: u64,
            actions: &'a [ShoppingListUpdateAction],
        }

        self.post_json(
            &format!("me/shopping-lists/{id}"),
            &UpdateRequest { version, actions },
        )
        .await
    }
}

impl ShoppingListApi for PlatformClient {
    async fn query_shopping_lists(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<ShoppingList>, ApiError> {
        Self::query_shopping_lists(self, name, limit).await
    }

    async fn create_shopping_list(
        &self,
        draft: &ShoppingListDraft,
    ) -> Result<ShoppingList, ApiError> {
        Self::create_shopping_list(self, draft).await
    }

    async fn update_shopping_list(
        &self,
        id: &ShoppingListId,
        version: u64,
        actions: &[ShoppingListUpdateAction],
    ) -> Result<ShoppingList, ApiError> {
        Self::update_shopping_list(self, id, version, actions).await
    }
}

impl CategoryApi for PlatformClient {
    async fn query_categories(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<PagedQueryResult<Category>, ApiError> {
        Self::query_categories(self, limit, offset).await
    }
}
