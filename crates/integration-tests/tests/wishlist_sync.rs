//! Wish-list synchronization scenarios against the in-memory platform.

use std::sync::{Arc, Mutex};

use sunrise_core::{DisplayContext, Observable, ProductId, VariantId};
use sunrise_integration_tests::{InMemoryPlatform, init_tracing};
use sunrise_shop::commerce::ApiError;
use sunrise_shop::services::wishlist::{ApplyPolicy, ToggleOutcome, WishListService};

fn service(platform: &InMemoryPlatform) -> WishListService<InMemoryPlatform> {
    WishListService::new(
        platform.clone(),
        DisplayContext::anonymous("DE", "EUR"),
        Observable::new(true),
    )
}

fn p(id: &str) -> ProductId {
    ProductId::new(id)
}

#[tokio::test]
async fn toggle_creates_container_lazily_and_reuses_it() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = service(&platform);

    let outcome = wish_list.toggle(&p("p1"), None).await.expect("toggle");
    assert_eq!(outcome, ToggleOutcome::Added);
    assert_eq!(platform.calls().shopping_list_creates, 1);

    wish_list.toggle(&p("p2"), None).await.expect("toggle");
    assert_eq!(platform.calls().shopping_list_creates, 1);

    let server = platform.list_named("WishList").expect("container");
    assert_eq!(server.line_items.len(), 2);
}

#[tokio::test]
async fn toggle_twice_restores_original_membership() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = service(&platform);

    wish_list.toggle(&p("keep"), Some(VariantId::new(1))).await.expect("seed");
    let before = wish_list.line_items().get();

    assert_eq!(
        wish_list.toggle(&p("p1"), Some(VariantId::new(2))).await.expect("add"),
        ToggleOutcome::Added
    );
    assert!(wish_list.is_in_wish_list(&p("p1"), Some(VariantId::new(2))));

    assert_eq!(
        wish_list.toggle(&p("p1"), Some(VariantId::new(2))).await.expect("remove"),
        ToggleOutcome::Removed
    );
    assert!(!wish_list.is_in_wish_list(&p("p1"), Some(VariantId::new(2))));

    let after = wish_list.line_items().get();
    assert_eq!(after.len(), before.len());
    assert!(wish_list.is_in_wish_list(&p("keep"), Some(VariantId::new(1))));
}

#[tokio::test]
async fn variant_membership_is_exact() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = service(&platform);

    wish_list.toggle(&p("p1"), Some(VariantId::new(1))).await.expect("add");

    assert!(wish_list.is_in_wish_list(&p("p1"), Some(VariantId::new(1))));
    // None means "any variant" and is a distinct entry, not a wildcard.
    assert!(!wish_list.is_in_wish_list(&p("p1"), None));
    assert!(!wish_list.is_in_wish_list(&p("p1"), Some(VariantId::new(2))));
}

#[tokio::test]
async fn anonymous_session_cannot_mutate() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = WishListService::new(
        platform.clone(),
        DisplayContext::anonymous("DE", "EUR"),
        Observable::new(false),
    );

    let err = wish_list.toggle(&p("p1"), None).await.expect_err("gated");
    assert!(matches!(err, ApiError::NotAuthenticated));
    assert_eq!(platform.calls().shopping_list_queries, 0);
}

#[tokio::test]
async fn optimistic_entry_is_visible_then_replaced_by_server_entry() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = service(&platform);

    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&snapshots);
    wish_list.line_items().subscribe(move |items| {
        recorded.lock().expect("lock").push(items.clone());
    });

    wish_list.toggle(&p("p1"), None).await.expect("toggle");

    let snapshots = snapshots.lock().expect("lock");
    let first = snapshots.first().expect("optimistic snapshot");
    assert!(first.iter().any(|item| item.id.is_placeholder()));

    let last = snapshots.last().expect("reconciled snapshot");
    assert!(last.iter().all(|item| !item.id.is_placeholder()));
    assert_eq!(last.len(), 1);
}

#[tokio::test]
async fn failed_mutation_rolls_back_optimistic_change() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = service(&platform);

    wish_list.toggle(&p("keep"), None).await.expect("seed");
    let before = wish_list.line_items().get();

    platform.plan_server_error();
    let err = wish_list.toggle(&p("p1"), None).await.expect_err("injected");
    assert!(matches!(err, ApiError::Api { status: 502, .. }));

    // The optimistic add is gone again and the server never saw it.
    assert_eq!(wish_list.line_items().get(), before);
    assert!(!wish_list.is_in_wish_list(&p("p1"), None));
    let server = platform.list_named("WishList").expect("container");
    assert_eq!(server.line_items.len(), 1);
}

#[tokio::test]
async fn version_conflict_is_retried_with_fresh_state() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = service(&platform);

    platform.plan_version_conflict();
    let outcome = wish_list.toggle(&p("p1"), None).await.expect("retried");
    assert_eq!(outcome, ToggleOutcome::Added);

    // First update conflicted, the resubmission succeeded.
    assert_eq!(platform.calls().shopping_list_updates, 2);
    assert!(wish_list.is_in_wish_list(&p("p1"), None));
}

#[tokio::test]
async fn persistent_conflict_surfaces_after_bounded_retries() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = service(&platform);

    // The initial attempt and both retries conflict; the fourth would
    // succeed but must never be sent.
    platform.plan_version_conflict();
    platform.plan_version_conflict();
    platform.plan_version_conflict();

    let err = wish_list.toggle(&p("p1"), None).await.expect_err("exhausted");
    assert!(err.is_version_conflict());
    assert_eq!(platform.calls().shopping_list_updates, 3);

    // The optimistic add is rolled back along with the failure.
    assert!(wish_list.line_items().get().is_empty());
    assert!(!wish_list.is_in_wish_list(&p("p1"), None));
}

#[tokio::test]
async fn on_confirmation_policy_defers_local_change_to_server_response() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = WishListService::new(
        platform.clone(),
        DisplayContext::anonymous("DE", "EUR"),
        Observable::new(true),
    )
    .with_policy(ApplyPolicy::OnConfirmation);

    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&snapshots);
    wish_list.line_items().subscribe(move |items| {
        recorded.lock().expect("lock").push(items.clone());
    });

    wish_list.toggle(&p("p1"), None).await.expect("toggle");

    // Exactly one notification: the server's list. No optimistic
    // placeholder entry was ever visible.
    let snapshots = snapshots.lock().expect("lock");
    assert_eq!(snapshots.len(), 1);
    assert!(snapshots.iter().flatten().all(|item| !item.id.is_placeholder()));
    assert!(wish_list.is_in_wish_list(&p("p1"), None));
}

#[tokio::test]
async fn conflict_after_concurrent_add_converges_without_duplicate() {
    init_tracing();
    let platform = InMemoryPlatform::new();
    let wish_list = service(&platform);

    // Another device adds p1 concurrently; our add conflicts, the re-fetch
    // finds the goal already reached.
    platform.plan_version_conflict_with_concurrent_add(p("p1"), None);
    let outcome = wish_list.toggle(&p("p1"), None).await.expect("converged");
    assert_eq!(outcome, ToggleOutcome::Added);

    assert_eq!(platform.calls().shopping_list_updates, 1);
    let server = platform.list_named("WishList").expect("container");
    assert_eq!(server.line_items.len(), 1);
    assert!(wish_list.is_in_wish_list(&p("p1"), None));
}
