//! Category navigation scenarios against the in-memory platform.

use sunrise_core::CategoryId;
use sunrise_integration_tests::{InMemoryPlatform, category, init_tracing};
use sunrise_shop::services::navigation::NavigationService;

#[tokio::test]
async fn flatten_then_drill_down() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    platform.seed_categories(vec![
        category("r1", None),
        category("c1", Some("r1")),
        category("c2", Some("r1")),
    ]);
    let navigation = NavigationService::new(platform.clone(), None);

    let tree = navigation.tree().await.expect("tree");
    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.roots().first().map(|c| c.id.as_str()), Some("r1"));
    let children: Vec<&str> = tree
        .children_of(&CategoryId::new("r1"))
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(children, vec!["c1", "c2"]);

    // Selecting the root shows its two children.
    let changes = navigation
        .activate(vec![category("r1", None)])
        .await
        .expect("activate root");
    assert_eq!(changes.insertions, vec![0, 1]);
    assert!(changes.deletions.is_empty());

    // Drilling into c1: c1 becomes the collapsed header (a modification),
    // its sibling c2 is deleted, and c1 has no children to insert.
    let changes = navigation
        .activate(vec![category("r1", None), category("c1", Some("r1"))])
        .await
        .expect("drill down");
    assert_eq!(changes.modifications, vec![0]);
    assert_eq!(changes.deletions, vec![1]);
    assert!(changes.insertions.is_empty());

    assert_eq!(navigation.active_path().get().len(), 2);
}

#[tokio::test]
async fn paginated_fetch_walks_all_pages() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    platform.set_max_page_size(50);
    platform.seed_categories((0..120).map(|i| category(&format!("c{i}"), None)).collect());
    let navigation = NavigationService::new(platform.clone(), None);

    let tree = navigation.tree().await.expect("tree");
    assert_eq!(tree.roots().len(), 120);
    // 120 categories at a 50-item page cap means three sequential pages.
    assert_eq!(platform.calls().category_queries, 3);
}

#[tokio::test]
async fn tree_is_cached_until_invalidated() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    platform.seed_categories(vec![category("r1", None)]);
    let navigation = NavigationService::new(platform.clone(), None);

    navigation.tree().await.expect("first fetch");
    navigation.tree().await.expect("cache hit");
    assert_eq!(platform.calls().category_queries, 1);

    platform.seed_categories(vec![category("r1", None), category("r2", None)]);
    navigation.invalidate();
    let tree = navigation.tree().await.expect("refetch");
    assert_eq!(tree.roots().len(), 2);
    assert_eq!(platform.calls().category_queries, 2);
}

#[tokio::test]
async fn active_path_notifies_subscribers_synchronously() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    platform.seed_categories(vec![category("r1", None), category("c1", Some("r1"))]);
    let navigation = NavigationService::new(platform.clone(), None);

    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorded = std::sync::Arc::clone(&seen);
    navigation.active_path().subscribe(move |path| {
        let ids: Vec<String> = path.iter().map(|c| c.id.to_string()).collect();
        recorded.lock().expect("lock").push(ids);
    });

    navigation
        .activate(vec![category("r1", None)])
        .await
        .expect("activate");

    assert_eq!(seen.lock().expect("lock").as_slice(), &[vec!["r1".to_string()]]);
}
