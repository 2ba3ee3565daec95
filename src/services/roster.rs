//! Paginated, partially live roster list.
//!
//! The first page follows a live subscription and every snapshot replaces
//! the list. Later pages are point-in-time reads appended behind a cursor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::filter::{FilterCriterion, filter_players};
use crate::backends::traits::{DocumentStore, PageQuery, PageWatch};
use crate::models::{PageCursor, Player};
use crate::utils::errors::{Result, RosterError};

const CHANGE_BUFFER: usize = 32;

/// Result of a continuation fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No cursor yet, another fetch in flight, or the list was reset meanwhile
    Skipped,
    Appended(usize),
    /// The store returned an empty page
    Exhausted,
}

/// Change notifications for views rendering the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterChange {
    /// A live snapshot replaced the list with this many players
    Reset(usize),
    Appended(usize),
}

#[derive(Debug, Default)]
struct RosterState {
    players: Vec<Player>,
    cursor: Option<PageCursor>,
    exhausted: bool,
}

#[derive(Debug)]
struct LoaderInner {
    store: Arc<dyn DocumentStore>,
    state: RwLock<RosterState>,
    fetching: AtomicBool,
    loading: AtomicBool,
    // Bumped by every snapshot; continuations started on an older list are dropped
    generation: AtomicU64,
    changes: broadcast::Sender<RosterChange>,
}

impl LoaderInner {
    async fn apply_snapshot(&self, page: Vec<Player>) {
        let count = page.len();
        {
            let mut state = self.state.write().await;
            state.cursor = page.last().map(PageCursor::after);
            state.players = page;
            state.exhausted = false;
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        self.loading.store(false, Ordering::SeqCst);
        debug!("Roster reset to live first page of {}", count);
        let _ = self.changes.send(RosterChange::Reset(count));
    }
}

/// Clears the in-flight flag however the continuation ends.
struct FetchGuard<'a>(&'a AtomicBool);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct RosterLoader {
    inner: Arc<LoaderInner>,
}

impl RosterLoader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            inner: Arc::new(LoaderInner {
                store,
                state: RwLock::new(RosterState::default()),
                fetching: AtomicBool::new(false),
                loading: AtomicBool::new(true),
                generation: AtomicU64::new(0),
                changes,
            }),
        }
    }

    /// Follow the first `page_size` players live.
    ///
    /// Resolves once the first snapshot is applied. Snapshots keep arriving
    /// until the returned subscription is closed or dropped.
    pub async fn subscribe_first_page(&self, page_size: usize) -> Result<RosterSubscription> {
        let mut watch = self.inner.store.watch_first_page(page_size).await?;

        match watch.next().await {
            Some(Ok(page)) => self.inner.apply_snapshot(page).await,
            Some(Err(e)) => {
                warn!("Initial roster snapshot failed: {}", e);
                return Err(e);
            }
            None => {
                return Err(RosterError::Backend(
                    "roster subscription closed before first snapshot".to_string(),
                ));
            }
        }

        info!(
            "Subscribed to first {} players on {}",
            page_size,
            self.inner.store.name()
        );

        let cancel = watch.cancellation_token();
        let task = tokio::spawn(follow_snapshots(self.inner.clone(), watch));
        Ok(RosterSubscription {
            cancel,
            task: Some(task),
        })
    }

    /// Append the page after the current cursor.
    ///
    /// Errors leave the list and cursor untouched.
    pub async fn fetch_next_page(&self, page_size: usize) -> Result<FetchOutcome> {
        if self
            .inner
            .fetching
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Continuation already in flight");
            return Ok(FetchOutcome::Skipped);
        }
        let _guard = FetchGuard(&self.inner.fetching);

        let (cursor, generation) = {
            let state = self.inner.state.read().await;
            (state.cursor.clone(), self.inner.generation.load(Ordering::SeqCst))
        };
        let Some(cursor) = cursor else {
            return Ok(FetchOutcome::Skipped);
        };

        let page = self
            .inner
            .store
            .fetch_page(&PageQuery::after(cursor, page_size))
            .await?;

        let mut state = self.inner.state.write().await;
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding continuation fetched before the last snapshot");
            return Ok(FetchOutcome::Skipped);
        }

        let Some(last) = page.last() else {
            state.exhausted = true;
            debug!("No players after cursor");
            return Ok(FetchOutcome::Exhausted);
        };

        let count = page.len();
        state.cursor = Some(PageCursor::after(last));
        state.players.extend(page);
        drop(state);

        debug!("Appended {} players", count);
        let _ = self.inner.changes.send(RosterChange::Appended(count));
        Ok(FetchOutcome::Appended(count))
    }

    pub async fn players(&self) -> Vec<Player> {
        self.inner.state.read().await.players.clone()
    }

    pub async fn cursor(&self) -> Option<PageCursor> {
        self.inner.state.read().await.cursor.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.state.read().await.players.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// True once a continuation came back empty, until the next snapshot.
    pub async fn is_exhausted(&self) -> bool {
        self.inner.state.read().await.exhausted
    }

    pub fn is_fetching(&self) -> bool {
        self.inner.fetching.load(Ordering::SeqCst)
    }

    /// True until the first snapshot has been applied.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    pub async fn filtered(&self, criterion: FilterCriterion, text: &str) -> Vec<Player> {
        let state = self.inner.state.read().await;
        filter_players(&state.players, criterion, text)
    }

    pub fn changes(&self) -> broadcast::Receiver<RosterChange> {
        self.inner.changes.subscribe()
    }
}

async fn follow_snapshots(inner: Arc<LoaderInner>, mut watch: PageWatch) {
    while let Some(snapshot) = watch.next().await {
        match snapshot {
            Ok(page) => inner.apply_snapshot(page).await,
            // Keep the last good page on screen
            Err(e) => warn!("Roster snapshot failed: {}", e),
        }
    }
    debug!("Roster subscription ended");
}

/// Handle to a live first-page subscription.
#[derive(Debug)]
pub struct RosterSubscription {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RosterSubscription {
    /// Stop applying snapshots and release the backend watch.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Close and wait for the snapshot task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!("Roster subscription task failed: {}", e);
        }
    }
}

impl Drop for RosterSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
