//! Cross-component scenario tests for Sunrise.
//!
//! The tests in `tests/` exercise the wish-list synchronizer and the
//! navigation service end to end against [`InMemoryPlatform`], an in-memory
//! implementation of the platform API seams. It mimics the platform's
//! observable behavior: version tokens, server-assigned line-item ids,
//! capped category pages, and - on request - injected failures and
//! concurrent mutations.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sunrise-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use sunrise_core::{
    Category, CategoryId, CategoryReference, LineItemId, LocalizedString, ProductId, ShoppingList,
    ShoppingListId, ShoppingListLineItem, VariantId,
};
use sunrise_shop::commerce::{
    ApiError, PagedQueryResult, ShoppingListDraft, ShoppingListUpdateAction,
};
use sunrise_shop::services::navigation::CategoryApi;
use sunrise_shop::services::wishlist::ShoppingListApi;
use uuid::Uuid;

/// Initialize test logging once; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a category fixture.
#[must_use]
pub fn category(id: &str, parent: Option<&str>) -> Category {
    Category {
        id: CategoryId::new(id),
        name: LocalizedString::from_single("en", id),
        parent: parent.map(|p| CategoryReference {
            id: CategoryId::new(p),
        }),
        external_id: None,
    }
}

/// Call counters exposed for assertions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallCounts {
    pub shopping_list_queries: usize,
    pub shopping_list_creates: usize,
    pub shopping_list_updates: usize,
    pub category_queries: usize,
}

/// A failure the platform injects into the next update call.
enum PlannedFailure {
    /// Fail with a generic server error.
    ServerError,
    /// Fail with a version conflict, optionally applying a concurrent add to
    /// the target list first (modelling another device racing this one).
    VersionConflict {
        concurrent_add: Option<(ProductId, Option<VariantId>)>,
    },
}

#[derive(Default)]
struct PlatformState {
    lists: Vec<ShoppingList>,
    categories: Vec<Category>,
    max_page_size: u32,
    planned_failures: VecDeque<PlannedFailure>,
    calls: CallCounts,
}

/// In-memory implementation of the platform API seams.
#[derive(Clone)]
pub struct InMemoryPlatform {
    inner: Arc<Mutex<PlatformState>>,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlatform {
    /// An empty platform with the default page cap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PlatformState {
                max_page_size: 500,
                ..PlatformState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlatformState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the category catalog.
    pub fn seed_categories(&self, categories: Vec<Category>) {
        self.lock().categories = categories;
    }

    /// Cap category pages at `limit` regardless of the requested page size,
    /// the way real platforms cap their page parameters.
    pub fn set_max_page_size(&self, limit: u32) {
        self.lock().max_page_size = limit;
    }

    /// Inject a server error into the next update call.
    pub fn plan_server_error(&self) {
        self.lock()
            .planned_failures
            .push_back(PlannedFailure::ServerError);
    }

    /// Inject a version conflict into the next update call.
    pub fn plan_version_conflict(&self) {
        self.lock()
            .planned_failures
            .push_back(PlannedFailure::VersionConflict {
                concurrent_add: None,
            });
    }

    /// Inject a version conflict caused by a concurrent add: the item lands
    /// in the list (with a bumped version) before the conflict is reported.
    pub fn plan_version_conflict_with_concurrent_add(
        &self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
    ) {
        self.lock()
            .planned_failures
            .push_back(PlannedFailure::VersionConflict {
                concurrent_add: Some((product_id, variant_id)),
            });
    }

    /// Snapshot of the call counters.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Server-side copy of the first list with the given name.
    #[must_use]
    pub fn list_named(&self, name: &str) -> Option<ShoppingList> {
        self.lock()
            .lists
            .iter()
            .find(|list| list.name.get("en") == Some(name))
            .cloned()
    }
}

fn server_line_item(product_id: ProductId, variant_id: Option<VariantId>) -> ShoppingListLineItem {
    ShoppingListLineItem {
        id: LineItemId::new(Uuid::new_v4().to_string()),
        product_id,
        variant_id,
        variant: None,
        added_at: Utc::now(),
    }
}

fn apply_action(list: &mut ShoppingList, action: &ShoppingListUpdateAction) {
    match action {
        ShoppingListUpdateAction::AddLineItem {
            product_id,
            variant_id,
            ..
        } => {
            list.line_items
                .push(server_line_item(product_id.clone(), *variant_id));
        }
        ShoppingListUpdateAction::RemoveLineItem { line_item_id, .. } => {
            list.line_items.retain(|item| item.id != *line_item_id);
        }
    }
}

impl ShoppingListApi for InMemoryPlatform {
    async fn query_shopping_lists(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<ShoppingList>, ApiError> {
        let mut state = self.lock();
        state.calls.shopping_list_queries += 1;

        // Most recently created first stands in for lastModifiedAt desc.
        Ok(state
            .lists
            .iter()
            .rev()
            .filter(|list| list.name.get("en") == Some(name))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_shopping_list(
        &self,
        draft: &ShoppingListDraft,
    ) -> Result<ShoppingList, ApiError> {
        let mut state = self.lock();
        state.calls.shopping_list_creates += 1;

        let list = ShoppingList {
            id: ShoppingListId::new(Uuid::new_v4().to_string()),
            version: 1,
            name: draft.name.clone(),
            line_items: Vec::new(),
        };
        state.lists.push(list.clone());
        Ok(list)
    }

    async fn update_shopping_list(
        &self,
        id: &ShoppingListId,
        version: u64,
        actions: &[ShoppingListUpdateAction],
    ) -> Result<ShoppingList, ApiError> {
        let mut state = self.lock();
        state.calls.shopping_list_updates += 1;

        if let Some(failure) = state.planned_failures.pop_front() {
            return Err(match failure {
                PlannedFailure::ServerError => ApiError::Api {
                    status: 502,
                    message: "injected server error".to_string(),
                },
                PlannedFailure::VersionConflict { concurrent_add } => {
                    if let Some((product_id, variant_id)) = concurrent_add
                        && let Some(list) = state.lists.iter_mut().find(|list| list.id == *id)
                    {
                        list.line_items
                            .push(server_line_item(product_id, variant_id));
                        list.version += 1;
                    }
                    let current_version = state
                        .lists
                        .iter()
                        .find(|list| list.id == *id)
                        .map(|list| list.version);
                    ApiError::VersionConflict { current_version }
                }
            });
        }

        let list = state
            .lists
            .iter_mut()
            .find(|list| list.id == *id)
            .ok_or_else(|| ApiError::NotFound(format!("shopping list {id}")))?;

        if list.version != version {
            return Err(ApiError::VersionConflict {
                current_version: Some(list.version),
            });
        }

        for action in actions {
            apply_action(list, action);
        }
        list.version += 1;
        Ok(list.clone())
    }
}

impl CategoryApi for InMemoryPlatform {
    async fn query_categories(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<PagedQueryResult<Category>, ApiError> {
        let mut state = self.lock();
        state.calls.category_queries += 1;

        let effective_limit = limit.min(state.max_page_size) as usize;
        let total = state.categories.len();
        let results: Vec<Category> = state
            .categories
            .iter()
            .skip(offset as usize)
            .take(effective_limit)
            .cloned()
            .collect();

        Ok(PagedQueryResult {
            offset,
            count: u32::try_from(results.len()).unwrap_or(u32::MAX),
            total: u32::try_from(total).unwrap_or(u32::MAX),
            results,
        })
    }
}
