//! Local-filesystem side of the device: a picker that hands back files
//! from fixed paths, and copying picked videos into app storage.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::traits::{MediaPicker, PickResult};
use crate::models::CapturedMedia;
use crate::utils::errors::{Result, RosterError};

/// Picker that "chooses" preconfigured files. A missing path means the user
/// dismissed the dialog.
#[derive(Debug, Clone, Default)]
pub struct FilePicker {
    photo: Option<PathBuf>,
    video: Option<PathBuf>,
}

impl FilePicker {
    pub fn new(photo: Option<PathBuf>, video: Option<PathBuf>) -> Self {
        Self { photo, video }
    }

    async fn pick(path: Option<&Path>) -> Result<PickResult> {
        let Some(path) = path else {
            debug!("Picker cancelled, nothing selected");
            return Ok(PickResult::Cancelled);
        };

        match CapturedMedia::from_path(path).await {
            Ok(media) => Ok(PickResult::Picked(media)),
            Err(RosterError::Io(e)) if e.kind() == ErrorKind::PermissionDenied => Err(
                RosterError::PermissionDenied(format!("cannot read {}", path.display())),
            ),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl MediaPicker for FilePicker {
    async fn pick_photo(&self) -> Result<PickResult> {
        Self::pick(self.photo.as_deref()).await
    }

    async fn pick_video(&self) -> Result<PickResult> {
        Self::pick(self.video.as_deref()).await
    }
}

fn local_path(uri: &str) -> Option<PathBuf> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if uri.contains("://") {
        return None;
    }
    Some(PathBuf::from(uri))
}

/// Copy a picked video into `videos_dir` so the reference outlives the
/// picker's temporary file.
///
/// Returns the `file://` URI of the copy, or the original URI unchanged
/// when it cannot be copied (content URIs, missing files, IO errors).
pub async fn persist_picked_video(uri: &str, videos_dir: &Path) -> String {
    let Some(source) = local_path(uri) else {
        debug!("Keeping non-file video URI as is: {}", uri);
        return uri.to_string();
    };

    let original_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("video_{}.mp4", Utc::now().timestamp_millis()));
    let destination = videos_dir.join(format!(
        "{}_{}",
        Utc::now().timestamp_millis(),
        original_name
    ));

    let copied: std::io::Result<u64> = async {
        tokio::fs::create_dir_all(videos_dir).await?;
        tokio::fs::copy(&source, &destination).await
    }
    .await;

    match copied {
        Ok(size) => {
            info!("Persisted video to {:?} ({} bytes)", destination, size);
            format!("file://{}", destination.display())
        }
        Err(e) => {
            warn!("Could not persist video {}: {}", uri, e);
            uri.to_string()
        }
    }
}
