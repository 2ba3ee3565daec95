//! In-process backends. Used by the offline demo and by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::traits::{DocumentStore, ObjectStorage, PageQuery, PageWatch};
use crate::models::{MediaKind, ObjectKey, Player, PlayerId, PlayerRecord};
use crate::utils::errors::{Result, RosterError};

const WATCH_BUFFER: usize = 16;

#[derive(Debug)]
struct StoreInner {
    records: RwLock<HashMap<PlayerId, PlayerRecord>>,
    // Bumped on every write so live watches re-evaluate their page
    revision: watch::Sender<u64>,
    fetches: AtomicUsize,
}

impl StoreInner {
    async fn sorted_players(&self) -> Vec<Player> {
        let records = self.records.read().await;
        let mut players: Vec<Player> = records
            .iter()
            .map(|(id, record)| Player::new(id.clone(), record.clone()))
            .collect();
        players.sort_by(Player::roster_cmp);
        players
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

/// Document store kept entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<StoreInner>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                records: RwLock::new(HashMap::new()),
                revision,
                fetches: AtomicUsize::new(0),
            }),
        }
    }

    /// Store pre-filled with the given players, keeping their identifiers.
    pub async fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let store = Self::new();
        for player in players {
            store.insert(player).await;
        }
        store
    }

    /// Insert or replace a record under a known identifier.
    pub async fn insert(&self, player: Player) {
        self.inner
            .records
            .write()
            .await
            .insert(player.id, player.record);
        self.inner.bump();
    }

    pub async fn len(&self) -> usize {
        self.inner.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of `fetch_page` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    fn generate_id() -> PlayerId {
        // Same length as Firestore auto ids
        let raw = uuid::Uuid::new_v4().simple().to_string();
        PlayerId::new(&raw[..20])
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<Player>> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        let page = query.select(&self.inner.sorted_players().await);
        trace!("Memory store served page of {}", page.len());
        Ok(page)
    }

    async fn watch_first_page(&self, limit: usize) -> Result<PageWatch> {
        let inner = self.inner.clone();
        let mut revisions = inner.revision.subscribe();
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let query = PageQuery::first(limit);
            let mut last_sent: Option<Vec<Player>> = None;
            loop {
                let page = query.select(&inner.sorted_players().await);
                if last_sent.as_ref() != Some(&page) {
                    if tx.send(Ok(page.clone())).await.is_err() {
                        break;
                    }
                    last_sent = Some(page);
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = revisions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("Memory page watch closed");
        });

        Ok(PageWatch::new(rx, cancel))
    }

    async fn get(&self, id: &PlayerId) -> Result<Option<Player>> {
        let records = self.inner.records.read().await;
        Ok(records
            .get(id)
            .map(|record| Player::new(id.clone(), record.clone())))
    }

    async fn create(&self, record: &PlayerRecord) -> Result<PlayerId> {
        let id = Self::generate_id();
        self.inner
            .records
            .write()
            .await
            .insert(id.clone(), record.clone());
        self.inner.bump();
        debug!("Created player {} in memory store", id);
        Ok(id)
    }

    async fn update(&self, id: &PlayerId, record: &PlayerRecord) -> Result<()> {
        {
            let mut records = self.inner.records.write().await;
            let existing = records
                .get_mut(id)
                .ok_or_else(|| RosterError::NotFound(id.to_string()))?;
            *existing = record.clone();
        }
        self.inner.bump();
        Ok(())
    }

    async fn set_media_reference(
        &self,
        id: &PlayerId,
        kind: MediaKind,
        reference: &str,
    ) -> Result<()> {
        {
            let mut records = self.inner.records.write().await;
            let existing = records
                .get_mut(id)
                .ok_or_else(|| RosterError::NotFound(id.to_string()))?;
            existing.set_media_reference(kind, reference);
        }
        self.inner.bump();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Object storage kept in memory; download URLs point at `base_url`.
#[derive(Debug, Clone)]
pub struct MemoryObjectStorage {
    base_url: String,
    objects: Arc<RwLock<HashMap<ObjectKey, StoredObject>>>,
}

impl Default for MemoryObjectStorage {
    fn default() -> Self {
        Self::new("http://localhost/storage")
    }
}

impl MemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn object(&self, key: &ObjectKey) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<ObjectKey> {
        let mut keys: Vec<_> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(&self, key: &ObjectKey, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(key) {
            return Err(RosterError::Upload(format!("object {} already exists", key)));
        }
        objects.insert(
            key.clone(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("{}/{}", self.base_url, key))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
