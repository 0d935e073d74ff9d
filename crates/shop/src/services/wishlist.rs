//! Wish-list synchronization with optimistic local updates.
//!
//! The wish list is a single named shopping-list container owned by the
//! customer session, created lazily on first access. Toggling an item applies
//! the change locally first (wish-list icons must react instantly), then
//! submits the mutation and reconciles with the server's authoritative list.
//! A failed mutation restores the pre-mutation snapshot instead of leaving
//! the local list inconsistent, and a stale version token is retried a
//! bounded number of times with freshly fetched state.

use chrono::{DateTime, Utc};
use sunrise_core::{
    DisplayContext, Observable, Price, ProductId, ShoppingList, ShoppingListLineItem, VariantId,
};
use tracing::{debug, instrument, warn};

use crate::commerce::{ApiError, ShoppingListDraft, ShoppingListUpdateAction};

use super::pricing;

/// Name of the wish-list container.
pub const WISH_LIST_NAME: &str = "WishList";

/// How often a version-conflicted mutation is resubmitted with fresh state
/// before the conflict is surfaced.
const VERSION_CONFLICT_RETRIES: u32 = 2;

/// Shopping-list operations the synchronizer needs from the platform.
///
/// Implemented by [`crate::commerce::PlatformClient`] and by the in-memory
/// platform used in tests.
#[allow(async_fn_in_trait)]
pub trait ShoppingListApi {
    /// Query lists by exact name, most recently modified first.
    async fn query_shopping_lists(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<ShoppingList>, ApiError>;

    /// Create a list from a draft.
    async fn create_shopping_list(
        &self,
        draft: &ShoppingListDraft,
    ) -> Result<ShoppingList, ApiError>;

    /// Apply update actions at a version.
    async fn update_shopping_list(
        &self,
        id: &sunrise_core::ShoppingListId,
        version: u64,
        actions: &[ShoppingListUpdateAction],
    ) -> Result<ShoppingList, ApiError>;
}

/// When a toggle's local effect becomes visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyPolicy {
    /// Apply locally before the server confirms (default).
    #[default]
    Optimistic,
    /// Apply only once the server's list comes back.
    OnConfirmation,
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The pair was absent and has been added.
    Added,
    /// The pair was present and has been removed.
    Removed,
}

/// Synchronizer for the customer's wish list.
pub struct WishListService<S> {
    api: S,
    context: DisplayContext,
    session: Observable<bool>,
    policy: ApplyPolicy,
    line_items: Observable<Vec<ShoppingListLineItem>>,
}

impl<S: ShoppingListApi> WishListService<S> {
    /// Create a new synchronizer with the optimistic apply policy.
    ///
    /// `session` is the "is authenticated" signal; mutations are refused for
    /// anonymous sessions.
    #[must_use]
    pub fn new(api: S, context: DisplayContext, session: Observable<bool>) -> Self {
        Self {
            api,
            context,
            session,
            policy: ApplyPolicy::default(),
            line_items: Observable::new(Vec::new()),
        }
    }

    /// Override the apply policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ApplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The local line-item list, for UI surfaces to subscribe to. Every
    /// replacement is already sorted (deals first, then newest first).
    #[must_use]
    pub fn line_items(&self) -> Observable<Vec<ShoppingListLineItem>> {
        self.line_items.clone()
    }

    /// Whether a `(product, variant)` pair is currently wish-listed.
    ///
    /// An O(n) scan over the local list; n is tens of items and the check is
    /// re-run by many cells at once, so it stays allocation-free.
    #[must_use]
    pub fn is_in_wish_list(&self, product_id: &ProductId, variant_id: Option<VariantId>) -> bool {
        self.line_items
            .get()
            .iter()
            .any(|item| item.matches(product_id, variant_id))
    }

    /// Re-fetch the wish list (creating it when absent) and replace the local
    /// list with the server's.
    ///
    /// # Errors
    ///
    /// Propagates query/create failures without retry.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let list = self.fetch_or_create().await?;
        self.install(list.line_items);
        Ok(())
    }

    /// Add the pair to the wish list when absent, remove it when present.
    ///
    /// The mutation is submitted against a freshly fetched container version.
    /// Under the optimistic policy the local list is updated before the
    /// server confirms and restored if the mutation fails. On success the
    /// local list is replaced wholesale by the server's, which also replaces
    /// any placeholder-id entry with its confirmed counterpart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotAuthenticated` for anonymous sessions, and
    /// surfaces fetch/mutation failures after rolling back the optimistic
    /// change.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle(
        &self,
        product_id: &ProductId,
        variant_id: Option<VariantId>,
    ) -> Result<ToggleOutcome, ApiError> {
        if !self.session.get() {
            return Err(ApiError::NotAuthenticated);
        }

        let list = self.fetch_or_create().await?;
        let existing = list.find_line_item(product_id, variant_id).cloned();
        let outcome = if existing.is_some() {
            ToggleOutcome::Removed
        } else {
            ToggleOutcome::Added
        };

        let snapshot = self.line_items.get();
        if self.policy == ApplyPolicy::Optimistic {
            self.apply_locally(product_id, variant_id, outcome);
        }

        let action = match &existing {
            Some(item) => ShoppingListUpdateAction::RemoveLineItem {
                line_item_id: item.id.clone(),
                quantity: None,
            },
            None => ShoppingListUpdateAction::AddLineItem {
                product_id: product_id.clone(),
                variant_id,
                quantity: None,
            },
        };

        match self
            .submit(&list, action, product_id, variant_id, outcome)
            .await
        {
            Ok(updated) => {
                self.install(updated.line_items);
                Ok(outcome)
            }
            Err(err) => {
                if self.policy == ApplyPolicy::Optimistic {
                    // Restore the pre-mutation snapshot rather than leaving
                    // an unconfirmed local change behind.
                    self.line_items.set(snapshot);
                }
                Err(err)
            }
        }
    }

    /// Fetch the wish-list container, creating it when the query finds none.
    ///
    /// Known race: two sessions hitting the empty-result path concurrently
    /// can both create a container; the platform does not enforce name
    /// uniqueness. The most-recently-modified sort makes all sessions
    /// converge on the same survivor afterwards.
    async fn fetch_or_create(&self) -> Result<ShoppingList, ApiError> {
        let mut lists = self.api.query_shopping_lists(WISH_LIST_NAME, 1).await?;
        if let Some(list) = lists.pop() {
            return Ok(list);
        }

        debug!("no wish list container found, creating one");
        self.api
            .create_shopping_list(&ShoppingListDraft::named(WISH_LIST_NAME))
            .await
    }

    /// Submit an action, re-fetching and resubmitting on version conflicts.
    async fn submit(
        &self,
        list: &ShoppingList,
        action: ShoppingListUpdateAction,
        product_id: &ProductId,
        variant_id: Option<VariantId>,
        intent: ToggleOutcome,
    ) -> Result<ShoppingList, ApiError> {
        let mut id = list.id.clone();
        let mut version = list.version;
        let mut action = action;
        let mut attempts = 0;

        loop {
            match self
                .api
                .update_shopping_list(&id, version, std::slice::from_ref(&action))
                .await
            {
                Ok(updated) => return Ok(updated),
                Err(err) if err.is_version_conflict() && attempts < VERSION_CONFLICT_RETRIES => {
                    attempts += 1;
                    warn!(attempts, "wish list version conflict, re-fetching");

                    let fresh = self.fetch_or_create().await?;
                    match (intent, fresh.find_line_item(product_id, variant_id)) {
                        // A concurrent mutation already produced the state
                        // this toggle was after.
                        (ToggleOutcome::Removed, None) | (ToggleOutcome::Added, Some(_)) => {
                            return Ok(fresh);
                        }
                        // The line item id may have changed across versions.
                        (ToggleOutcome::Removed, Some(item)) => {
                            action = ShoppingListUpdateAction::RemoveLineItem {
                                line_item_id: item.id.clone(),
                                quantity: None,
                            };
                        }
                        (ToggleOutcome::Added, None) => {}
                    }
                    id = fresh.id;
                    version = fresh.version;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Apply a toggle to the local list ahead of server confirmation.
    fn apply_locally(
        &self,
        product_id: &ProductId,
        variant_id: Option<VariantId>,
        outcome: ToggleOutcome,
    ) {
        self.line_items.update(|items| match outcome {
            ToggleOutcome::Removed => {
                items.retain(|item| !item.matches(product_id, variant_id));
            }
            ToggleOutcome::Added => {
                items.push(ShoppingListLineItem::optimistic(
                    product_id.clone(),
                    variant_id,
                ));
            }
        });
    }

    /// Replace the local list with a server list, sorted for display.
    fn install(&self, mut items: Vec<ShoppingListLineItem>) {
        sort_line_items(&mut items, &self.context, Utc::now());
        self.line_items.set(items);
    }
}

/// Sort line items for display: discounted items first, largest discount
/// first, then within equal discounts (including none) most recently added
/// first. Deals surface at the top, newest additions right below.
pub fn sort_line_items(
    items: &mut [ShoppingListLineItem],
    context: &DisplayContext,
    now: DateTime<Utc>,
) {
    items.sort_by(|a, b| {
        let discount_a = item_discount_cents(a, context, now);
        let discount_b = item_discount_cents(b, context, now);
        discount_b
            .cmp(&discount_a)
            .then_with(|| b.added_at.cmp(&a.added_at))
    });
}

/// The discount on a line item's display price, in minor units.
///
/// Uses the context-resolved price of the denormalized variant snapshot,
/// falling back to the snapshot's first price when nothing resolves.
fn item_discount_cents(
    item: &ShoppingListLineItem,
    context: &DisplayContext,
    now: DateTime<Utc>,
) -> i64 {
    let Some(variant) = &item.variant else {
        return 0;
    };
    pricing::select_price(&variant.prices, context, now)
        .or_else(|| variant.prices.first())
        .map_or(0, Price::discount_cents)
}
