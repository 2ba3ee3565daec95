//! Firestore documents plus Firebase Storage objects over REST.

mod api;
mod codec;
mod storage;

#[cfg(test)]
mod tests;

pub use api::FirestoreApi;
pub use storage::FirebaseStorage;

use async_trait::async_trait;
use serde_json::Map;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::traits::{DocumentStore, PageQuery, PageWatch};
use crate::config::{FirebaseConfig, RosterConfig};
use crate::models::{MediaKind, Player, PlayerId, PlayerRecord};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct FirestoreStore {
    api: Arc<FirestoreApi>,
    poll_interval: Duration,
}

impl FirestoreStore {
    pub fn new(firebase: &FirebaseConfig, roster: &RosterConfig) -> Result<Self> {
        let api = FirestoreApi::new(
            firebase.firestore_url.clone(),
            firebase.project_id.clone(),
            roster.collection.clone(),
            firebase.api_key.clone(),
        )?;
        Ok(Self::with_api(api, roster.poll_interval()))
    }

    pub fn with_api(api: FirestoreApi, poll_interval: Duration) -> Self {
        Self {
            api: Arc::new(api),
            poll_interval,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<Player>> {
        self.api.run_query(query).await
    }

    async fn watch_first_page(&self, limit: usize) -> Result<PageWatch> {
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let api = self.api.clone();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // REST has no listen channel: poll and forward only real changes
        tokio::spawn(async move {
            let query = PageQuery::first(limit);
            let mut last_sent: Option<Vec<Player>> = None;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let snapshot = match api.run_query(&query).await {
                    Ok(page) if last_sent.as_ref() == Some(&page) => continue,
                    Ok(page) => {
                        last_sent = Some(page.clone());
                        Ok(page)
                    }
                    Err(e) => {
                        warn!("First page refresh failed: {}", e);
                        Err(e)
                    }
                };

                if tx.send(snapshot).await.is_err() {
                    break;
                }
            }
            debug!("Firestore page watch closed");
        });

        Ok(PageWatch::new(rx, cancel))
    }

    async fn get(&self, id: &PlayerId) -> Result<Option<Player>> {
        self.api.get_document(id).await
    }

    async fn create(&self, record: &PlayerRecord) -> Result<PlayerId> {
        self.api.create_document(record).await
    }

    async fn update(&self, id: &PlayerId, record: &PlayerRecord) -> Result<()> {
        self.api.update_document(id, record).await
    }

    async fn set_media_reference(
        &self,
        id: &PlayerId,
        kind: MediaKind,
        reference: &str,
    ) -> Result<()> {
        let field = kind.field_name().to_string();
        let mut fields = Map::new();
        fields.insert(
            field.clone(),
            codec::to_firestore_value(&serde_json::Value::from(reference)),
        );
        self.api.patch_document(id, fields, &[field]).await
    }

    fn name(&self) -> &str {
        "firestore"
    }
}
