//! Category navigation: tree flattening and active-path row diffs.
//!
//! Categories arrive as one flat paginated list. [`CategoryTree::build`]
//! partitions it into roots and a children adjacency in a single pass, with
//! an optional external-id override that pins navigation to a subtree.
//! [`active_path_diff`] turns a breadcrumb transition into the index sets an
//! incrementally-updated list needs: rows to delete, rows to re-render in
//! place, rows to insert.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use sunrise_core::{Category, CategoryId, Observable};
use tracing::{debug, instrument, warn};

use crate::commerce::{ApiError, PagedQueryResult};

/// Page size for the category fetch loop.
const CATEGORY_PAGE_SIZE: u32 = 500;

/// How long a fetched tree stays fresh.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(300);

/// Category queries the navigation service needs from the platform.
#[allow(async_fn_in_trait)]
pub trait CategoryApi {
    /// One page of categories; callers loop until the page reports itself
    /// last.
    async fn query_categories(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<PagedQueryResult<Category>, ApiError>;
}

// =============================================================================
// Tree
// =============================================================================

/// Root/children adjacency derived from the flat category list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    roots: Vec<Category>,
    children_by_parent: HashMap<CategoryId, Vec<Category>>,
}

impl CategoryTree {
    /// Build the tree in a single pass over the flat list.
    ///
    /// Roots are the parentless categories, children keep input order. When
    /// `navigation_external_id` matches a category's external id, that
    /// category's children become the roots instead - navigation pinned to a
    /// subtree without a separate admin flag.
    #[must_use]
    pub fn build(categories: &[Category], navigation_external_id: Option<&str>) -> Self {
        let mut roots = Vec::new();
        let mut children_by_parent: HashMap<CategoryId, Vec<Category>> = HashMap::new();

        for category in categories {
            match category.parent_id() {
                None => roots.push(category.clone()),
                Some(parent_id) => children_by_parent
                    .entry(parent_id.clone())
                    .or_default()
                    .push(category.clone()),
            }
        }

        if let Some(external_id) = navigation_external_id
            && let Some(pinned) = categories
                .iter()
                .find(|category| category.external_id.as_deref() == Some(external_id))
        {
            roots = children_by_parent.get(&pinned.id).cloned().unwrap_or_default();
        }

        Self {
            roots,
            children_by_parent,
        }
    }

    /// The navigation roots.
    #[must_use]
    pub fn roots(&self) -> &[Category] {
        &self.roots
    }

    /// Children of a category, in input order.
    #[must_use]
    pub fn children_of(&self, id: &CategoryId) -> &[Category] {
        self.children_by_parent
            .get(id)
            .map_or(&[], Vec::as_slice)
    }
}

// =============================================================================
// Active-path diff
// =============================================================================

/// Row index sets describing one list transition.
///
/// `deletions` and `modifications` index the previously visible rows;
/// `insertions` index the new visible rows. No previous index appears in both
/// `deletions` and `modifications`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowChanges {
    /// Previous rows to remove.
    pub deletions: Vec<usize>,
    /// Previous rows kept but re-rendered in place (e.g., a selected child
    /// collapsing into a header row).
    pub modifications: Vec<usize>,
    /// New rows to insert.
    pub insertions: Vec<usize>,
}

impl RowChanges {
    /// Whether the transition changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.modifications.is_empty() && self.insertions.is_empty()
    }
}

/// The rows a breadcrumb path puts on screen.
///
/// Depth 0 shows nothing, depth 1 shows the active root's children, depth 2+
/// shows the selected child as a collapsed header row followed by the path
/// tail's children.
#[must_use]
pub fn visible_rows(tree: &CategoryTree, path: &[Category]) -> Vec<Category> {
    match path {
        [] => Vec::new(),
        [root] => tree.children_of(&root.id).to_vec(),
        [_, selected, ..] => {
            let mut rows = vec![selected.clone()];
            if let Some(last) = path.last() {
                rows.extend(tree.children_of(&last.id).iter().cloned());
            }
            rows
        }
    }
}

/// Index diff for the transition from showing `previous`'s rows to showing
/// `current`'s rows.
///
/// Re-activating the current path is a no-op, not a full re-render.
/// Collapsing back from depth 2+ to depth 1 deletes the whole previous range
/// (header plus grandchildren) and inserts the root's children outright. Any
/// other transition reclassifies a row present on both sides as a
/// modification, so a still-selected row animates a state change instead of
/// flashing out and back in.
#[must_use]
pub fn active_path_diff(
    tree: &CategoryTree,
    previous: &[Category],
    current: &[Category],
) -> RowChanges {
    if previous == current {
        return RowChanges::default();
    }

    let old = visible_rows(tree, previous);
    let new = visible_rows(tree, current);

    if previous.len() >= 2 && current.len() == 1 {
        return RowChanges {
            deletions: (0..old.len()).collect(),
            modifications: Vec::new(),
            insertions: (0..new.len()).collect(),
        };
    }

    let old_ids: HashSet<&CategoryId> = old.iter().map(|row| &row.id).collect();
    let new_ids: HashSet<&CategoryId> = new.iter().map(|row| &row.id).collect();

    let mut changes = RowChanges::default();
    for (index, row) in old.iter().enumerate() {
        if new_ids.contains(&row.id) {
            changes.modifications.push(index);
        } else {
            changes.deletions.push(index);
        }
    }
    for (index, row) in new.iter().enumerate() {
        if !old_ids.contains(&row.id) {
            changes.insertions.push(index);
        }
    }
    changes
}

// =============================================================================
// Service
// =============================================================================

/// Owns the category cache and the active navigation path.
///
/// Refreshes are serialized behind one async mutex because pagination must
/// run sequentially, and gated by a cache-expiry timestamp. [`invalidate`]
/// bumps a generation counter; a refresh that raced an invalidation discards
/// its pages and fetches again instead of installing stale data.
///
/// [`invalidate`]: NavigationService::invalidate
pub struct NavigationService<C> {
    api: C,
    navigation_external_id: Option<String>,
    ttl: Duration,
    generation: AtomicU64,
    cache: tokio::sync::Mutex<CacheState>,
    active_path: Observable<Vec<Category>>,
}

#[derive(Default)]
struct CacheState {
    tree: Option<CategoryTree>,
    fetched_at: Option<Instant>,
    generation_at_fetch: u64,
}

impl<C: CategoryApi> NavigationService<C> {
    /// Create a new navigation service.
    #[must_use]
    pub fn new(api: C, navigation_external_id: Option<String>) -> Self {
        Self {
            api,
            navigation_external_id,
            ttl: CATEGORY_CACHE_TTL,
            generation: AtomicU64::new(0),
            cache: tokio::sync::Mutex::new(CacheState::default()),
            active_path: Observable::new(Vec::new()),
        }
    }

    /// Override the cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Drop the cached tree; the next [`tree`] call re-fetches.
    ///
    /// [`tree`]: NavigationService::tree
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// The current category tree, fetched or served from cache.
    ///
    /// # Errors
    ///
    /// Propagates page-fetch failures; a partially fetched tree is never
    /// installed.
    #[instrument(skip(self))]
    pub async fn tree(&self) -> Result<CategoryTree, ApiError> {
        let mut cache = self.cache.lock().await;

        if let (Some(tree), Some(fetched_at)) = (&cache.tree, cache.fetched_at)
            && fetched_at.elapsed() < self.ttl
            && cache.generation_at_fetch == self.generation.load(Ordering::SeqCst)
        {
            debug!("category cache hit");
            return Ok(tree.clone());
        }

        loop {
            let generation = self.generation.load(Ordering::SeqCst);
            let categories = self.fetch_all_pages().await?;

            // An invalidation may have landed while pages were in flight;
            // fetch again rather than install a stale snapshot.
            if self.generation.load(Ordering::SeqCst) != generation {
                warn!("categories invalidated during refresh, re-fetching");
                continue;
            }

            let tree = CategoryTree::build(&categories, self.navigation_external_id.as_deref());
            cache.tree = Some(tree.clone());
            cache.fetched_at = Some(Instant::now());
            cache.generation_at_fetch = generation;
            return Ok(tree);
        }
    }

    /// Fetch every category page sequentially.
    async fn fetch_all_pages(&self) -> Result<Vec<Category>, ApiError> {
        let mut categories = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.api.query_categories(CATEGORY_PAGE_SIZE, offset).await?;
            let is_last = page.is_last_page();
            // An empty page claiming more results would never advance the
            // offset; stop with what we have instead of looping.
            if page.count == 0 && !is_last {
                warn!(offset, total = page.total, "empty non-final category page, stopping early");
                return Ok(categories);
            }
            offset = page.offset + page.count;
            categories.extend(page.results);
            if is_last {
                debug!(total = categories.len(), "fetched all category pages");
                return Ok(categories);
            }
        }
    }

    /// The active breadcrumb path, for UI surfaces to subscribe to.
    #[must_use]
    pub fn active_path(&self) -> Observable<Vec<Category>> {
        self.active_path.clone()
    }

    /// Make `path` the active breadcrumb and return the row changes the
    /// transition needs.
    ///
    /// # Errors
    ///
    /// Propagates a failed tree fetch; the active path is untouched then.
    pub async fn activate(&self, path: Vec<Category>) -> Result<RowChanges, ApiError> {
        let tree = self.tree().await?;
        let previous = self.active_path.get();
        let changes = active_path_diff(&tree, &previous, &path);
        self.active_path.set(path);
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use sunrise_core::{CategoryReference, LocalizedString};

    use super::*;

    fn category(id: &str, parent: Option<&str>) -> Category {
        Category {
            id: CategoryId::new(id),
            name: LocalizedString::from_single("en", id),
            parent: parent.map(|p| CategoryReference {
                id: CategoryId::new(p),
            }),
            external_id: None,
        }
    }

    fn sample_tree() -> CategoryTree {
        CategoryTree::build(
            &[
                category("r1", None),
                category("r2", None),
                category("c1", Some("r1")),
                category("c2", Some("r1")),
                category("g1", Some("c1")),
                category("d1", Some("r2")),
            ],
            None,
        )
    }

    fn ids(rows: &[Category]) -> Vec<&str> {
        rows.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_build_partitions_roots_and_children() {
        let tree = sample_tree();
        assert_eq!(ids(tree.roots()), vec!["r1", "r2"]);
        assert_eq!(ids(tree.children_of(&CategoryId::new("r1"))), vec!["c1", "c2"]);
        assert_eq!(ids(tree.children_of(&CategoryId::new("c1"))), vec!["g1"]);
        assert!(tree.children_of(&CategoryId::new("g1")).is_empty());
    }

    #[test]
    fn test_external_id_pins_navigation_root() {
        let mut pinned = category("r1", None);
        pinned.external_id = Some("main-nav".to_string());
        let tree = CategoryTree::build(
            &[
                pinned,
                category("r2", None),
                category("c1", Some("r1")),
                category("c2", Some("r1")),
            ],
            Some("main-nav"),
        );

        // r1's children become the roots; r2 is no longer navigable.
        assert_eq!(ids(tree.roots()), vec!["c1", "c2"]);
    }

    #[test]
    fn test_visible_rows_per_depth() {
        let tree = sample_tree();
        assert!(visible_rows(&tree, &[]).is_empty());
        assert_eq!(
            ids(&visible_rows(&tree, &[category("r1", None)])),
            vec!["c1", "c2"]
        );
        // Depth 2: collapsed header plus grandchildren.
        assert_eq!(
            ids(&visible_rows(
                &tree,
                &[category("r1", None), category("c1", Some("r1"))]
            )),
            vec!["c1", "g1"]
        );
    }

    #[test]
    fn test_drill_down_keeps_selected_row_as_modification() {
        let tree = sample_tree();
        let changes = active_path_diff(
            &tree,
            &[category("r1", None)],
            &[category("r1", None), category("c1", Some("r1"))],
        );

        // c1 collapses into the header, c2 goes away, g1 appears below.
        assert_eq!(changes.modifications, vec![0]);
        assert_eq!(changes.deletions, vec![1]);
        assert_eq!(changes.insertions, vec![1]);
    }

    #[test]
    fn test_collapse_back_deletes_full_range() {
        let tree = sample_tree();
        let changes = active_path_diff(
            &tree,
            &[category("r1", None), category("c1", Some("r1"))],
            &[category("r1", None)],
        );

        // Header plus grandchildren go, the root's children come back whole.
        assert_eq!(changes.deletions, vec![0, 1]);
        assert!(changes.modifications.is_empty());
        assert_eq!(changes.insertions, vec![0, 1]);
    }

    #[test]
    fn test_reactivating_same_path_changes_nothing() {
        let tree = sample_tree();
        let path = vec![category("r1", None), category("c1", Some("r1"))];
        assert!(active_path_diff(&tree, &path, &path).is_empty());
    }

    #[test]
    fn test_root_switch_replaces_children() {
        let tree = sample_tree();
        let changes = active_path_diff(&tree, &[category("r1", None)], &[category("r2", None)]);

        assert_eq!(changes.deletions, vec![0, 1]);
        assert!(changes.modifications.is_empty());
        assert_eq!(changes.insertions, vec![0]);
    }

    /// Always claims ten results but only ever delivers one.
    struct TruncatedPages;

    impl CategoryApi for TruncatedPages {
        async fn query_categories(
            &self,
            _limit: u32,
            offset: u32,
        ) -> Result<PagedQueryResult<Category>, ApiError> {
            let results = if offset == 0 {
                vec![category("r1", None)]
            } else {
                Vec::new()
            };
            Ok(PagedQueryResult {
                offset,
                count: u32::try_from(results.len()).unwrap_or(u32::MAX),
                total: 10,
                results,
            })
        }
    }

    #[tokio::test]
    async fn test_empty_non_final_page_terminates_fetch() {
        let service = NavigationService::new(TruncatedPages, None);
        let tree = service.tree().await.expect("tree");
        assert_eq!(ids(tree.roots()), vec!["r1"]);
    }

    #[test]
    fn test_diff_invariants_hold() {
        let tree = sample_tree();
        let paths: Vec<Vec<Category>> = vec![
            vec![],
            vec![category("r1", None)],
            vec![category("r2", None)],
            vec![category("r1", None), category("c1", Some("r1"))],
            vec![category("r1", None), category("c2", Some("r1"))],
        ];

        for previous in &paths {
            for current in &paths {
                let changes = active_path_diff(&tree, previous, current);
                let old_len = visible_rows(&tree, previous).len();
                let new_len = visible_rows(&tree, current).len();

                if previous == current {
                    assert!(changes.is_empty());
                    continue;
                }

                // Deletions and modifications partition a subset of the old
                // rows without overlap.
                let mut previous_indices: Vec<usize> = changes
                    .deletions
                    .iter()
                    .chain(&changes.modifications)
                    .copied()
                    .collect();
                previous_indices.sort_unstable();
                previous_indices.dedup();
                assert_eq!(
                    previous_indices.len(),
                    changes.deletions.len() + changes.modifications.len()
                );
                assert_eq!(previous_indices.len(), old_len);

                // Kept rows plus insertions reproduce the new row count.
                assert_eq!(old_len - changes.deletions.len() + changes.insertions.len(), new_len);
            }
        }
    }
}
