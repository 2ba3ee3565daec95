mod draft;
mod identifiers;

pub use draft::{CapturedMedia, DraftOverrides, PlayerDraft, VideoChoice};
pub use identifiers::{ObjectKey, PlayerId};

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Document body of a player, exactly as stored in the `players` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRecord {
    /// Jersey number
    pub alias: String,
    pub name: String,
    pub last_name: String,
    pub position: String,
    #[serde(deserialize_with = "deserialize_age")]
    pub age: i64,
    pub height: String,
    pub weight: String,
    /// Team label
    pub teams: String,
    pub initials: String,
    /// Photo reference: empty, `data:` URL, remote URL, device URI or bundled file name
    pub headshot: String,
    /// Inline base64 JPEG, takes precedence over `headshot`
    pub headshot_base64: String,
    /// Video reference: empty, bundled clip name, remote URL, hosted link or device URI
    pub video: String,
}

impl PlayerRecord {
    /// "First Last", the form the name filter matches against.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }

    pub fn media_reference(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Photo => &self.headshot,
            MediaKind::Video => &self.video,
        }
    }

    pub fn set_media_reference(&mut self, kind: MediaKind, reference: impl Into<String>) {
        match kind {
            MediaKind::Photo => self.headshot = reference.into(),
            MediaKind::Video => self.video = reference.into(),
        }
    }
}

/// A stored player together with its document identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(flatten)]
    pub record: PlayerRecord,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, record: PlayerRecord) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }

    /// Roster order: first name ascending, document id as tie-break.
    pub fn roster_cmp(&self, other: &Player) -> Ordering {
        self.record
            .name
            .cmp(&other.record.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.record.name, self.record.last_name)
    }
}

/// Marker for the last record of the most recently fetched roster page.
///
/// Continuation queries return records strictly after this position in
/// roster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    name: String,
    id: PlayerId,
}

impl PageCursor {
    pub fn after(player: &Player) -> Self {
        Self {
            name: player.record.name.clone(),
            id: player.id.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// True when `player` sorts strictly after the cursor position.
    pub fn precedes(&self, player: &Player) -> bool {
        (self.name.as_str(), &self.id) < (player.record.name.as_str(), &player.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Document field holding the reference for this kind.
    pub fn field_name(&self) -> &'static str {
        match self {
            MediaKind::Photo => "headshot",
            MediaKind::Video => "video",
        }
    }

    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
        }
    }

    pub fn default_mime(&self) -> &'static str {
        match self {
            MediaKind::Photo => "image/jpeg",
            MediaKind::Video => "video/mp4",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Parse an age typed as free text.
///
/// Reads the leading integer the way a form field would: leading whitespace
/// and an optional sign are accepted, trailing text after the digits is
/// dropped, and anything without leading digits becomes zero. Values past
/// the `i64` range saturate.
pub fn parse_age(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    unsigned
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0i64, |acc, digit| {
            let digit = i64::from(digit);
            if negative {
                acc.saturating_mul(10).saturating_sub(digit)
            } else {
                acc.saturating_mul(10).saturating_add(digit)
            }
        })
}

fn deserialize_age<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    // Older revisions of the form stored age as text
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|v| v.trunc() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => parse_age(&s),
        _ => 0,
    })
}
