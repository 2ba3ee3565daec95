use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::models::{CapturedMedia, MediaKind, ObjectKey, PageCursor, Player, PlayerId, PlayerRecord};
use crate::utils::errors::Result;

/// One bounded, name-ordered read of the player collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Return only records strictly after this position
    pub after: Option<PageCursor>,
    pub limit: usize,
}

impl PageQuery {
    pub fn first(limit: usize) -> Self {
        Self { after: None, limit }
    }

    pub fn after(cursor: PageCursor, limit: usize) -> Self {
        Self {
            after: Some(cursor),
            limit,
        }
    }

    /// Apply this query to an already sorted slice of players.
    pub fn select(&self, sorted: &[Player]) -> Vec<Player> {
        sorted
            .iter()
            .filter(|p| self.after.as_ref().is_none_or(|cursor| cursor.precedes(p)))
            .take(self.limit)
            .cloned()
            .collect()
    }
}

/// Live view over the first roster page.
///
/// Every item is the complete page after a change on the backend. The
/// watch stops once closed or dropped.
#[derive(Debug)]
pub struct PageWatch {
    receiver: mpsc::Receiver<Result<Vec<Player>>>,
    cancel: CancellationToken,
}

impl PageWatch {
    pub fn new(receiver: mpsc::Receiver<Result<Vec<Player>>>, cancel: CancellationToken) -> Self {
        Self { receiver, cancel }
    }

    /// Next snapshot, or `None` once the watch is closed.
    pub async fn next(&mut self) -> Option<Result<Vec<Player>>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            snapshot = self.receiver.recv() => snapshot,
        }
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for PageWatch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Point-in-time read of one page, ordered by first name.
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<Player>>;

    /// Open a live subscription to the first `limit` records.
    ///
    /// The current page is delivered immediately, then again after every
    /// change that affects it.
    async fn watch_first_page(&self, limit: usize) -> Result<PageWatch>;

    async fn get(&self, id: &PlayerId) -> Result<Option<Player>>;

    /// Insert a new record; the store assigns the identifier.
    async fn create(&self, record: &PlayerRecord) -> Result<PlayerId>;

    /// Overwrite an existing record. Fails with `NotFound` if it does not exist.
    async fn update(&self, id: &PlayerId, record: &PlayerRecord) -> Result<()>;

    /// Patch only the photo or video reference of an existing record.
    async fn set_media_reference(&self, id: &PlayerId, kind: MediaKind, reference: &str)
    -> Result<()>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug {
    /// Write a blob once and return its public download URL.
    async fn upload(&self, key: &ObjectKey, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    Picked(CapturedMedia),
    Cancelled,
}

impl PickResult {
    pub fn into_media(self) -> Option<CapturedMedia> {
        match self {
            PickResult::Picked(media) => Some(media),
            PickResult::Cancelled => None,
        }
    }
}

/// Device photo/video chooser.
///
/// A refused media-library permission is reported as
/// `RosterError::PermissionDenied`, a dismissed dialog as `Cancelled`.
#[async_trait]
pub trait MediaPicker: Send + Sync + std::fmt::Debug {
    async fn pick_photo(&self) -> Result<PickResult>;

    async fn pick_video(&self) -> Result<PickResult>;
}
