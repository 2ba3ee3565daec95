pub mod mocks;

use frontcat::backends::{MemoryDocumentStore, MemoryObjectStorage};
use frontcat::models::{Player, PlayerDraft, PlayerRecord};
use std::time::Duration;
use tempfile::TempDir;

pub fn player(id: &str, name: &str, last_name: &str, age: i64) -> Player {
    Player::new(
        id,
        PlayerRecord {
            name: name.to_string(),
            last_name: last_name.to_string(),
            age,
            ..Default::default()
        },
    )
}

/// `count` players whose names sort in a different order than their ids.
pub fn shuffled_roster(count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| {
            let name = format!("Name {:03}", (i * 7) % count);
            player(&format!("id-{:03}", i), &name, "Test", 20 + (i % 15) as i64)
        })
        .collect()
}

pub fn draft(name: &str, age: &str) -> PlayerDraft {
    PlayerDraft {
        name: name.to_string(),
        last_name: "Test".to_string(),
        age: age.to_string(),
        ..Default::default()
    }
}

pub struct TestContext {
    pub store: MemoryDocumentStore,
    pub storage: MemoryObjectStorage,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub async fn new(players: Vec<Player>) -> Self {
        Self {
            store: MemoryDocumentStore::with_players(players).await,
            storage: MemoryObjectStorage::new("https://storage.test"),
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }
}

/// Poll `condition` every 10ms until it holds or `max_wait` elapses.
pub async fn eventually<F, Fut>(mut condition: F, max_wait: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    while start.elapsed() < max_wait {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
