use crate::common::mocks::MockStore;
use crate::common::{TestContext, eventually, player, shuffled_roster};
use frontcat::RosterError;
use frontcat::services::{FetchOutcome, FilterCriterion, RosterLoader};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const PAGE: usize = 10;

#[tokio::test]
async fn test_paging_walks_whole_roster_in_name_order() {
    let ctx = TestContext::new(shuffled_roster(23)).await;
    let loader = RosterLoader::new(Arc::new(ctx.store.clone()));
    let _sub = loader.subscribe_first_page(PAGE).await.unwrap();

    let first = loader.players().await;
    assert_eq!(first.len(), PAGE);

    let mut outcomes = Vec::new();
    loop {
        let outcome = loader.fetch_next_page(PAGE).await.unwrap();
        outcomes.push(outcome);
        if outcome == FetchOutcome::Exhausted {
            break;
        }
    }
    assert_eq!(
        outcomes,
        vec![
            FetchOutcome::Appended(10),
            FetchOutcome::Appended(3),
            FetchOutcome::Exhausted
        ]
    );

    let players = loader.players().await;
    assert_eq!(players.len(), 23);
    assert!(
        players
            .windows(2)
            .all(|w| w[0].record.name < w[1].record.name)
    );
    let unique: HashSet<_> = players.iter().map(|p| p.id.clone()).collect();
    assert_eq!(unique.len(), 23);
}

#[tokio::test]
async fn test_concurrent_continuations_share_one_request() {
    let ctx = TestContext::new(shuffled_roster(23)).await;
    let store = MockStore::new(ctx.store.clone()).with_fetch_delay(Duration::from_millis(50));
    let loader = RosterLoader::new(Arc::new(store));
    let _sub = loader.subscribe_first_page(PAGE).await.unwrap();

    let a = loader.clone();
    let b = loader.clone();
    let (ra, rb) = tokio::join!(a.fetch_next_page(PAGE), b.fetch_next_page(PAGE));
    let outcomes = [ra.unwrap(), rb.unwrap()];

    assert_eq!(ctx.store.fetch_count(), 1);
    assert!(outcomes.contains(&FetchOutcome::Skipped));
    assert!(outcomes.contains(&FetchOutcome::Appended(10)));
    assert_eq!(loader.len().await, 20);
}

#[tokio::test]
async fn test_failed_continuation_leaves_state_untouched() {
    let ctx = TestContext::new(shuffled_roster(23)).await;
    let store = MockStore::new(ctx.store.clone());
    let loader = RosterLoader::new(Arc::new(store.clone()));
    let _sub = loader.subscribe_first_page(PAGE).await.unwrap();
    let before = loader.players().await;
    let cursor = loader.cursor().await;

    store.inject_error("unavailable");
    let err = loader.fetch_next_page(PAGE).await.unwrap_err();
    assert!(matches!(err, RosterError::Backend(_)));
    assert_eq!(loader.players().await, before);
    assert_eq!(loader.cursor().await, cursor);
    assert!(!loader.is_fetching());

    store.clear_error();
    assert_eq!(
        loader.fetch_next_page(PAGE).await.unwrap(),
        FetchOutcome::Appended(10)
    );
}

#[tokio::test]
async fn test_live_first_page_follows_creates() {
    let ctx = TestContext::new(shuffled_roster(5)).await;
    let loader = RosterLoader::new(Arc::new(ctx.store.clone()));
    let _sub = loader.subscribe_first_page(PAGE).await.unwrap();
    assert_eq!(loader.len().await, 5);

    ctx.store.insert(player("new", "Aaron", "Gordon", 29)).await;

    let loader_ref = loader.clone();
    let seen = eventually(
        move || {
            let loader = loader_ref.clone();
            async move { loader.len().await == 6 }
        },
        Duration::from_secs(2),
    )
    .await;
    assert!(seen);
    assert_eq!(loader.players().await[0].record.name, "Aaron");
}

#[tokio::test]
async fn test_age_filter_matches_substring() {
    let ctx = TestContext::new(vec![
        player("a", "Ayo", "Dosunmu", 23),
        player("b", "Coby", "White", 123),
        player("c", "Josh", "Giddey", 32),
    ])
    .await;
    let loader = RosterLoader::new(Arc::new(ctx.store.clone()));
    let _sub = loader.subscribe_first_page(PAGE).await.unwrap();

    let hits = loader.filtered(FilterCriterion::Age, "23").await;
    let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);

    assert_eq!(loader.filtered(FilterCriterion::Age, "").await.len(), 3);
}
