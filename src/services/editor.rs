//! Create and update player records from form drafts.
//!
//! Metadata is committed first. Photo uploads to object storage run
//! detached afterwards and never roll the record back.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backends::local::persist_picked_video;
use crate::backends::traits::{DocumentStore, MediaPicker, ObjectStorage, PickResult};
use crate::catalog::AssetRegistry;
use crate::config::{MediaConfig, PhotoStrategy};
use crate::models::{
    CapturedMedia, MediaKind, ObjectKey, PlayerDraft, PlayerId, PlayerRecord, VideoChoice,
};
use crate::utils::errors::{Result, RosterError};
use crate::utils::image_encoder::encode_inline_photo;

/// Outcome of a successful save.
#[derive(Debug)]
pub struct SaveReceipt {
    pub id: PlayerId,
    /// Pending photo upload when the object-storage strategy is active
    pub upload: Option<UploadHandle>,
}

/// Completed upload, with the reference written to the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub id: PlayerId,
    pub kind: MediaKind,
    pub key: ObjectKey,
    pub url: String,
}

/// A detached upload. Dropping the handle does not cancel it.
#[derive(Debug)]
pub struct UploadHandle {
    id: PlayerId,
    kind: MediaKind,
    key: ObjectKey,
    task: JoinHandle<Result<UploadReport>>,
}

impl UploadHandle {
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the upload and the record patch to complete.
    pub async fn wait(self) -> Result<UploadReport> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(RosterError::Upload(format!("upload task failed: {}", e))),
        }
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

#[derive(Debug, Clone)]
pub struct PlayerEditor {
    store: Arc<dyn DocumentStore>,
    storage: Option<Arc<dyn ObjectStorage>>,
    media: MediaConfig,
    assets: &'static AssetRegistry,
}

impl PlayerEditor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Option<Arc<dyn ObjectStorage>>,
        media: MediaConfig,
    ) -> Self {
        Self {
            store,
            storage,
            media,
            assets: AssetRegistry::bundled(),
        }
    }

    pub fn media_config(&self) -> &MediaConfig {
        &self.media
    }

    /// Create a player, or update `existing_id` in place.
    ///
    /// Validation failures return before anything is written.
    pub async fn save(
        &self,
        draft: &PlayerDraft,
        existing_id: Option<&PlayerId>,
    ) -> Result<SaveReceipt> {
        if existing_id.is_some_and(|id| id.is_empty()) {
            return Err(RosterError::MissingIdentifier);
        }

        let mut record = draft.to_record();
        self.apply_video(&mut record, draft.new_video.as_ref())?;
        let pending_upload = self.apply_photo(&mut record, draft.new_photo.as_ref()).await?;

        let id = match existing_id {
            Some(id) => {
                self.store.update(id, &record).await?;
                info!("Updated player {} ({})", id, record.full_name());
                id.clone()
            }
            None => {
                let id = self.store.create(&record).await?;
                info!("Created player {} ({})", id, record.full_name());
                id
            }
        };

        let upload = match pending_upload {
            Some(photo) => Some(self.upload_media(&id, MediaKind::Photo, photo)?),
            None => None,
        };

        Ok(SaveReceipt { id, upload })
    }

    /// Upload a photo for an already saved player and point its record at it.
    pub fn upload_photo(&self, id: &PlayerId, photo: CapturedMedia) -> Result<UploadHandle> {
        self.upload_media(id, MediaKind::Photo, photo)
    }

    /// Start a detached upload to object storage, bounded by the upload timeout.
    pub fn upload_media(
        &self,
        id: &PlayerId,
        kind: MediaKind,
        media: CapturedMedia,
    ) -> Result<UploadHandle> {
        if id.is_empty() {
            return Err(RosterError::MissingIdentifier);
        }
        let storage = self.require_storage()?;

        let key = object_key(self.media.storage_prefix(kind), kind, &media);
        let content_type = media.mime_or_default(kind);
        let timeout = self.media.upload_timeout();
        let store = self.store.clone();

        debug!("Uploading {} for {} as {}", kind, id, key);
        let task = tokio::spawn(run_upload(
            store,
            storage,
            id.clone(),
            kind,
            key.clone(),
            media.bytes,
            content_type,
            timeout,
        ));

        Ok(UploadHandle {
            id: id.clone(),
            kind,
            key,
            task,
        })
    }

    /// Copy a picked video into the app's video directory.
    ///
    /// Returns the URI to store on the record, which is the original one if
    /// no directory is available or the copy fails.
    pub async fn persist_picked_video(&self, uri: &str) -> String {
        match self.media.videos_dir() {
            Some(dir) => persist_picked_video(uri, &dir).await,
            None => uri.to_string(),
        }
    }

    /// Ask the picker for a photo and attach it to the draft.
    ///
    /// A dismissed picker leaves the draft untouched; picker errors such as
    /// `PermissionDenied` are returned as is.
    pub async fn attach_picked_photo(
        &self,
        picker: &dyn MediaPicker,
        draft: PlayerDraft,
    ) -> Result<PlayerDraft> {
        match picker.pick_photo().await? {
            PickResult::Picked(media) => {
                debug!("Picked photo {}", media.uri);
                Ok(draft.with_photo(media))
            }
            PickResult::Cancelled => Ok(draft),
        }
    }

    /// Ask the picker for a video, copy it into app storage and attach the
    /// resulting URI to the draft.
    pub async fn attach_picked_video(
        &self,
        picker: &dyn MediaPicker,
        draft: PlayerDraft,
    ) -> Result<PlayerDraft> {
        match picker.pick_video().await? {
            PickResult::Picked(media) => {
                let uri = self.persist_picked_video(&media.uri).await;
                Ok(draft.with_video(VideoChoice::Picked(uri)))
            }
            PickResult::Cancelled => Ok(draft),
        }
    }

    fn require_storage(&self) -> Result<Arc<dyn ObjectStorage>> {
        self.storage.clone().ok_or_else(|| {
            RosterError::Configuration("object storage is not configured".to_string())
        })
    }

    fn apply_video(&self, record: &mut PlayerRecord, choice: Option<&VideoChoice>) -> Result<()> {
        match choice {
            Some(VideoChoice::Bundled(name)) => {
                if !self.assets.contains(MediaKind::Video, name) {
                    return Err(RosterError::InvalidInput(format!(
                        "unknown bundled clip: {}",
                        name
                    )));
                }
                record.video = name.clone();
            }
            Some(VideoChoice::Picked(uri)) => record.video = uri.clone(),
            None => {}
        }
        Ok(())
    }

    /// Apply a newly captured photo. Returns the photo when it still has to
    /// be uploaded after the record is saved.
    async fn apply_photo(
        &self,
        record: &mut PlayerRecord,
        photo: Option<&CapturedMedia>,
    ) -> Result<Option<CapturedMedia>> {
        let Some(photo) = photo else {
            return Ok(None);
        };

        match self.media.photo_strategy {
            PhotoStrategy::Inline => {
                record.headshot_base64 = encode_inline_photo(
                    photo.bytes.clone(),
                    self.media.inline_width,
                    self.media.inline_quality,
                )
                .await?;
                debug!("Encoded inline photo ({} chars)", record.headshot_base64.len());
                Ok(None)
            }
            PhotoStrategy::ObjectStorage => {
                self.require_storage()?;
                // Inline data would keep shadowing the uploaded photo
                record.headshot_base64.clear();
                Ok(Some(photo.clone()))
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_upload(
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    id: PlayerId,
    kind: MediaKind,
    key: ObjectKey,
    bytes: Vec<u8>,
    content_type: String,
    timeout: Duration,
) -> Result<UploadReport> {
    let upload = async {
        let url = storage
            .upload(&key, bytes, &content_type)
            .await
            .map_err(|e| match e {
                RosterError::PermissionDenied(_) | RosterError::Upload(_) => e,
                other => RosterError::Upload(other.to_string()),
            })?;
        store.set_media_reference(&id, kind, &url).await?;
        Ok::<_, RosterError>(url)
    };

    match tokio::time::timeout(timeout, upload).await {
        Ok(Ok(url)) => {
            info!("Uploaded {} for player {}", kind, id);
            Ok(UploadReport { id, kind, key, url })
        }
        Ok(Err(e)) => {
            warn!("Upload of {} for player {} failed: {}", kind, id, e);
            Err(e)
        }
        Err(_) => {
            warn!("Upload of {} for player {} timed out after {:?}", kind, id, timeout);
            Err(RosterError::UploadTimeout(timeout))
        }
    }
}

/// `<prefix>/<sanitized stem>_<millis>_<random>.<ext>`
fn object_key(prefix: &str, kind: MediaKind, media: &CapturedMedia) -> ObjectKey {
    let file_name = media.file_name();
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext.to_lowercase()),
        _ => (file_name, kind.default_extension().to_string()),
    };

    let mut sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        sanitized = kind.to_string();
    }

    let suffix = Uuid::new_v4().simple().to_string();
    ObjectKey::new(format!(
        "{}/{}_{}_{}.{}",
        prefix.trim_end_matches('/'),
        sanitized,
        Utc::now().timestamp_millis(),
        &suffix[..8],
        extension
    ))
}
