pub mod firebase;
pub mod local;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use firebase::{FirebaseStorage, FirestoreStore};
pub use local::{FilePicker, persist_picked_video};
pub use memory::{MemoryDocumentStore, MemoryObjectStorage};
pub use traits::{DocumentStore, MediaPicker, ObjectStorage, PageQuery, PageWatch, PickResult};

use std::sync::Arc;
use tracing::info;

use crate::config::{BackendKind, Config, PhotoStrategy};
use crate::utils::errors::Result;

/// Service handles opened once at startup and shared by the services.
#[derive(Debug, Clone)]
pub struct Backends {
    pub store: Arc<dyn DocumentStore>,
    pub storage: Option<Arc<dyn ObjectStorage>>,
}

impl Backends {
    pub fn new(store: Arc<dyn DocumentStore>, storage: Option<Arc<dyn ObjectStorage>>) -> Self {
        Self { store, storage }
    }

    /// Build the backends selected in the configuration.
    ///
    /// Object storage is only opened when photos are uploaded rather than
    /// stored inline, or when a bucket is configured for video uploads.
    pub fn connect(config: &Config) -> Result<Self> {
        let wants_storage = config.media.photo_strategy == PhotoStrategy::ObjectStorage;

        let backends = match config.backend.kind {
            BackendKind::Memory => {
                let storage: Arc<dyn ObjectStorage> = Arc::new(MemoryObjectStorage::default());
                Self::new(Arc::new(MemoryDocumentStore::new()), Some(storage))
            }
            BackendKind::Firebase => {
                let store = FirestoreStore::new(&config.firebase, &config.roster)?;
                let storage = if wants_storage || !config.firebase.storage_bucket.is_empty() {
                    let storage = FirebaseStorage::new(
                        config.firebase.storage_url.clone(),
                        config.firebase.storage_bucket.clone(),
                    )?;
                    Some(Arc::new(storage) as Arc<dyn ObjectStorage>)
                } else {
                    None
                };
                Self::new(Arc::new(store), storage)
            }
        };

        info!(
            "Connected to {} store (object storage: {})",
            backends.store.name(),
            backends
                .storage
                .as_ref()
                .map(|s| s.name().to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        Ok(backends)
    }
}
