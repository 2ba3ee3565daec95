#![cfg(test)]

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::backends::memory::MemoryDocumentStore;
use crate::backends::traits::{DocumentStore, PageQuery, PageWatch};
use crate::models::{MediaKind, Player, PlayerId, PlayerRecord};
use crate::utils::errors::Result;

pub fn record_named(name: &str) -> PlayerRecord {
    PlayerRecord {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn named_player(id: &str, name: &str) -> Player {
    Player::new(id, record_named(name))
}

/// Players `p00..pNN` with names that sort in id order.
pub fn numbered_roster(count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| named_player(&format!("p{:02}", i), &format!("Player {:02}", i)))
        .collect()
}

/// Wait for an async condition to become true
pub async fn wait_for_async<F, Fut>(mut condition: F, max_wait: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = std::time::Instant::now();

    while start.elapsed() < max_wait {
        if condition().await {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }

    false
}

/// Document store that delays page reads, for exercising overlapping fetches.
#[derive(Debug, Clone)]
pub struct SlowStore {
    pub inner: MemoryDocumentStore,
    pub fetch_delay: Duration,
}

impl SlowStore {
    pub fn new(inner: MemoryDocumentStore, fetch_delay: Duration) -> Self {
        Self { inner, fetch_delay }
    }
}

#[async_trait]
impl DocumentStore for SlowStore {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<Player>> {
        sleep(self.fetch_delay).await;
        self.inner.fetch_page(query).await
    }

    async fn watch_first_page(&self, limit: usize) -> Result<PageWatch> {
        self.inner.watch_first_page(limit).await
    }

    async fn get(&self, id: &PlayerId) -> Result<Option<Player>> {
        self.inner.get(id).await
    }

    async fn create(&self, record: &PlayerRecord) -> Result<PlayerId> {
        self.inner.create(record).await
    }

    async fn update(&self, id: &PlayerId, record: &PlayerRecord) -> Result<()> {
        self.inner.update(id, record).await
    }

    async fn set_media_reference(
        &self,
        id: &PlayerId,
        kind: MediaKind,
        reference: &str,
    ) -> Result<()> {
        self.inner.set_media_reference(id, kind, reference).await
    }

    fn name(&self) -> &str {
        "slow-memory"
    }
}
