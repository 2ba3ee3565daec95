use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_COLLECTION, DEFAULT_PAGE_SIZE, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_UPLOAD_TIMEOUT_SECS,
    INLINE_PHOTO_QUALITY, INLINE_PHOTO_WIDTH, PHOTO_STORAGE_PREFIX, VIDEO_STORAGE_PREFIX,
};
use crate::models::MediaKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub roster: RosterConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub firebase: FirebaseConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process store, nothing leaves the machine
    #[default]
    Memory,
    Firebase,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Seconds between first-page refreshes on backends without push updates
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

/// Where newly captured photos end up.
///
/// The two strategies are exclusive per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoStrategy {
    /// Compressed JPEG stored as base64 on the record
    #[default]
    Inline,
    /// Uploaded to object storage, record patched with the download URL
    ObjectStorage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub photo_strategy: PhotoStrategy,

    #[serde(default = "default_inline_width")]
    pub inline_width: u32,

    #[serde(default = "default_inline_quality")]
    pub inline_quality: u8,

    /// Seconds before an upload is cancelled
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout: u64,

    #[serde(default = "default_photo_prefix")]
    pub photo_prefix: String,

    #[serde(default = "default_video_prefix")]
    pub video_prefix: String,

    /// Directory picked videos are copied into; defaults to the app data dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub project_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub storage_bucket: String,

    #[serde(default = "default_firestore_url")]
    pub firestore_url: String,

    #[serde(default = "default_storage_url")]
    pub storage_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read the config at `path`, writing defaults there if it does not exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let contents =
                fs::read_to_string(config_path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.validate()?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.roster.page_size == 0 {
            anyhow::bail!("roster.page_size must be at least 1");
        }
        if self.roster.collection.trim().is_empty() {
            anyhow::bail!("roster.collection must not be empty");
        }
        if self.backend.kind == BackendKind::Firebase && self.firebase.project_id.is_empty() {
            anyhow::bail!("firebase.project_id is required for the firebase backend");
        }
        if self.media.photo_strategy == PhotoStrategy::ObjectStorage
            && self.backend.kind == BackendKind::Firebase
            && self.firebase.storage_bucket.is_empty()
        {
            anyhow::bail!("firebase.storage_bucket is required to upload photos");
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("frontcat").join("config.toml"))
    }
}

impl RosterConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval.max(1))
    }
}

impl MediaConfig {
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout)
    }

    pub fn storage_prefix(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Photo => &self.photo_prefix,
            MediaKind::Video => &self.video_prefix,
        }
    }

    pub fn videos_dir(&self) -> Option<PathBuf> {
        self.videos_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("frontcat").join("videos")))
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            page_size: default_page_size(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            photo_strategy: PhotoStrategy::default(),
            inline_width: default_inline_width(),
            inline_quality: default_inline_quality(),
            upload_timeout: default_upload_timeout(),
            photo_prefix: default_photo_prefix(),
            video_prefix: default_video_prefix(),
            videos_dir: None,
        }
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: None,
            storage_bucket: String::new(),
            firestore_url: default_firestore_url(),
            storage_url: default_storage_url(),
        }
    }
}

// Default value functions
fn default_collection() -> String { DEFAULT_COLLECTION.to_string() }
fn default_page_size() -> usize { DEFAULT_PAGE_SIZE }
fn default_poll_interval() -> u64 { DEFAULT_POLL_INTERVAL_SECS }
fn default_inline_width() -> u32 { INLINE_PHOTO_WIDTH }
fn default_inline_quality() -> u8 { INLINE_PHOTO_QUALITY }
fn default_upload_timeout() -> u64 { DEFAULT_UPLOAD_TIMEOUT_SECS }
fn default_photo_prefix() -> String { PHOTO_STORAGE_PREFIX.to_string() }
fn default_video_prefix() -> String { VIDEO_STORAGE_PREFIX.to_string() }
fn default_firestore_url() -> String { "https://firestore.googleapis.com".to_string() }
fn default_storage_url() -> String { "https://firebasestorage.googleapis.com".to_string() }
