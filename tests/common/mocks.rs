use async_trait::async_trait;
use frontcat::backends::traits::{DocumentStore, ObjectStorage, PageQuery, PageWatch};
use frontcat::models::{MediaKind, ObjectKey, Player, PlayerId, PlayerRecord};
use frontcat::{Result, RosterError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Wraps a store and fails page reads while an error is injected.
#[derive(Debug, Clone)]
pub struct MockStore<S> {
    pub inner: S,
    pub error_mode: Arc<Mutex<Option<String>>>,
    pub fetch_delay: Duration,
}

impl<S: DocumentStore> MockStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            error_mode: Arc::new(Mutex::new(None)),
            fetch_delay: Duration::ZERO,
        }
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn inject_error(&self, error: &str) {
        *self.error_mode.lock().unwrap() = Some(error.to_string());
    }

    pub fn clear_error(&self) {
        *self.error_mode.lock().unwrap() = None;
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for MockStore<S> {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<Player>> {
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        let injected = self.error_mode.lock().unwrap().clone();
        if let Some(error) = injected {
            return Err(RosterError::Backend(error));
        }
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
        "mock"
    }
}

/// Storage whose uploads can be stalled or made to fail a number of times.
#[derive(Debug, Clone)]
pub struct MockStorage<S> {
    pub inner: S,
    pub delay: Duration,
    pub failures_left: Arc<AtomicUsize>,
    pub attempts: Arc<AtomicUsize>,
}

impl<S: ObjectStorage> MockStorage<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            delay: Duration::ZERO,
            failures_left: Arc::new(AtomicUsize::new(0)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn stalled(inner: S, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(inner)
        }
    }

    pub fn failing(inner: S, times: usize) -> Self {
        let storage = Self::new(inner);
        storage.failures_left.store(times, Ordering::SeqCst);
        storage
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: ObjectStorage> ObjectStorage for MockStorage<S> {
    async fn upload(&self, key: &ObjectKey, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RosterError::Upload("storage unavailable".to_string()));
        }
        self.inner.upload(key, bytes, content_type).await
    }

    fn name(&self) -> &str {
        "mock-storage"
    }
}
