use std::path::Path;

use super::{MediaKind, Player, PlayerRecord, parse_age};
use crate::utils::errors::Result;

/// Photo or video chosen on the device during an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMedia {
    /// Device URI the picker returned (`file://`, `content://` or a plain path)
    pub uri: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl CapturedMedia {
    pub fn new(uri: impl Into<String>, bytes: Vec<u8>) -> Self {
        let uri = uri.into();
        let path = uri.split('?').next().unwrap_or_default();
        let mime = mime_from_name(path).map(str::to_string);
        Self { uri, bytes, mime }
    }

    /// Read a picked file from the local filesystem.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(format!("file://{}", path.display()), bytes))
    }

    /// Last path segment of the URI, without any query string.
    pub fn file_name(&self) -> &str {
        let without_query = self.uri.split('?').next().unwrap_or_default();
        without_query.rsplit('/').next().unwrap_or_default()
    }

    pub fn mime_or_default(&self, kind: MediaKind) -> String {
        self.mime
            .clone()
            .unwrap_or_else(|| kind.default_mime().to_string())
    }
}

fn mime_from_name(name: &str) -> Option<&'static str> {
    let extension = name.rsplit('.').next()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(mime)
}

/// How the video reference of a draft was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoChoice {
    /// One of the clips packaged with the app, by file name
    Bundled(String),
    /// A URI returned by the media picker, stored verbatim
    Picked(String),
}

/// Raw form input for creating or editing a player.
///
/// Every field is kept as typed; conversion happens on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDraft {
    pub alias: String,
    pub name: String,
    pub last_name: String,
    pub position: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub teams: String,
    pub initials: String,
    /// Existing references are carried over untouched unless new media is chosen
    pub headshot: String,
    pub headshot_base64: String,
    pub video: String,
    pub new_photo: Option<CapturedMedia>,
    pub new_video: Option<VideoChoice>,
}

/// Field values typed for one save. `None` leaves the draft's value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftOverrides {
    pub alias: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub age: Option<String>,
    pub teams: Option<String>,
}

impl PlayerDraft {
    /// Replace only the fields that were given.
    pub fn apply(&mut self, overrides: DraftOverrides) {
        let fields = [
            (&mut self.alias, overrides.alias),
            (&mut self.name, overrides.name),
            (&mut self.last_name, overrides.last_name),
            (&mut self.position, overrides.position),
            (&mut self.age, overrides.age),
            (&mut self.teams, overrides.teams),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    /// Seed the form from a stored player for edit mode.
    pub fn from_player(player: &Player) -> Self {
        let record = &player.record;
        Self {
            alias: record.alias.clone(),
            name: record.name.clone(),
            last_name: record.last_name.clone(),
            position: record.position.clone(),
            age: record.age.to_string(),
            height: record.height.clone(),
            weight: record.weight.clone(),
            teams: record.teams.clone(),
            initials: record.initials.clone(),
            headshot: record.headshot.clone(),
            headshot_base64: record.headshot_base64.clone(),
            video: record.video.clone(),
            new_photo: None,
            new_video: None,
        }
    }

    pub fn with_photo(mut self, photo: CapturedMedia) -> Self {
        self.new_photo = Some(photo);
        self
    }

    pub fn with_video(mut self, choice: VideoChoice) -> Self {
        self.new_video = Some(choice);
        self
    }

    /// Field values as they will be written, before any new media is applied.
    pub fn to_record(&self) -> PlayerRecord {
        PlayerRecord {
            alias: self.alias.clone(),
            name: self.name.clone(),
            last_name: self.last_name.clone(),
            position: self.position.clone(),
            age: parse_age(&self.age),
            height: self.height.clone(),
            weight: self.weight.clone(),
            teams: self.teams.clone(),
            initials: self.initials.clone(),
            headshot: self.headshot.clone(),
            headshot_base64: self.headshot_base64.clone(),
            video: self.video.clone(),
        }
    }
}
