//! Turns the photo and video references stored on a player into something
//! a screen can render.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use std::fmt;
use tracing::{debug, trace};
use url::Url;

use crate::catalog::{AssetRegistry, BundledAsset, PLACEHOLDER_HEADSHOT};
use crate::constants::{HOSTED_EMBED_BASE, HOSTED_SHORT_LINK, HOSTED_VIDEO_DOMAINS};
use crate::models::{MediaKind, Player};

const DEFAULT_INLINE_MIME: &str = "image/jpeg";

/// Where the bytes for a photo or video come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Decoded inline data
    Inline { mime: String, data: Vec<u8> },
    /// `http(s)://` resource, fetched or streamed directly
    RemoteUrl(Url),
    /// `file://` or `content://` resource on the device
    LocalUri(String),
    /// Media packaged with the app
    BundledAsset(&'static BundledAsset),
    /// Hosted-platform video, played through its embeddable player
    HostedEmbed { video_id: String, embed_url: Url },
    /// Nothing usable; render a placeholder
    None,
}

impl MediaSource {
    pub fn is_available(&self) -> bool {
        !matches!(self, MediaSource::None)
    }

    /// URI a web view or player can load, when the source has one.
    pub fn uri(&self) -> Option<String> {
        match self {
            MediaSource::Inline { mime, data } => {
                Some(format!("data:{};base64,{}", mime, STANDARD.encode(data)))
            }
            MediaSource::RemoteUrl(url) => Some(url.to_string()),
            MediaSource::LocalUri(uri) => Some(uri.clone()),
            MediaSource::BundledAsset(asset) => Some(asset.path.to_string()),
            MediaSource::HostedEmbed { embed_url, .. } => Some(embed_url.to_string()),
            MediaSource::None => None,
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Inline { mime, data } => write!(f, "inline {} ({} bytes)", mime, data.len()),
            MediaSource::RemoteUrl(url) => write!(f, "remote {}", url),
            MediaSource::LocalUri(uri) => write!(f, "local {}", uri),
            MediaSource::BundledAsset(asset) => write!(f, "bundled {}", asset.file_name),
            MediaSource::HostedEmbed { video_id, .. } => write!(f, "hosted video {}", video_id),
            MediaSource::None => write!(f, "no media"),
        }
    }
}

/// Maps stored media references to a [`MediaSource`].
#[derive(Debug, Clone, Copy)]
pub struct MediaResolver {
    assets: &'static AssetRegistry,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new(AssetRegistry::bundled())
    }
}

impl MediaResolver {
    pub fn new(assets: &'static AssetRegistry) -> Self {
        Self { assets }
    }

    pub fn player_photo(&self, player: &Player) -> MediaSource {
        self.resolve_photo(&player.record.headshot_base64, &player.record.headshot)
    }

    /// What a headshot view shows: the resolved photo, or the placeholder
    /// asset path when nothing resolves.
    pub fn player_photo_or_placeholder(&self, player: &Player) -> String {
        match self.player_photo(player) {
            MediaSource::None => format!("placeholder {}", PLACEHOLDER_HEADSHOT),
            source => source.to_string(),
        }
    }

    pub fn player_video(&self, player: &Player) -> MediaSource {
        self.resolve_video(&player.record.video)
    }

    /// Resolve a headshot from the inline payload and the photo reference.
    ///
    /// Inline data wins over any reference. Data that fails to decode is
    /// skipped rather than reported.
    pub fn resolve_photo(&self, inline: &str, reference: &str) -> MediaSource {
        let inline = inline.trim();
        if let Some(payload) = inline.strip_prefix("data:") {
            if let Some((mime, data)) = decode_data_url(payload) {
                return MediaSource::Inline { mime, data };
            }
        } else if let Some(data) = decode_base64(inline) {
            return MediaSource::Inline {
                mime: DEFAULT_INLINE_MIME.to_string(),
                data,
            };
        }

        let reference = reference.trim();
        if let Some(payload) = reference.strip_prefix("data:")
            && let Some((mime, data)) = decode_data_url(payload)
        {
            return MediaSource::Inline { mime, data };
        }

        self.resolve_reference(MediaKind::Photo, reference)
    }

    /// Resolve a video reference.
    ///
    /// Hosted-platform links are recognized before generic web URLs since
    /// their pages are not playable streams.
    pub fn resolve_video(&self, reference: &str) -> MediaSource {
        let reference = reference.trim();
        if is_hosted_video_link(reference) {
            return match extract_hosted_video_id(reference) {
                Some(video_id) => hosted_embed(video_id),
                None => {
                    debug!("Hosted video link without an id: {}", reference);
                    MediaSource::None
                }
            };
        }

        self.resolve_reference(MediaKind::Video, reference)
    }

    fn resolve_reference(&self, kind: MediaKind, reference: &str) -> MediaSource {
        if reference.is_empty() {
            return MediaSource::None;
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            if let Ok(url) = Url::parse(reference) {
                return MediaSource::RemoteUrl(url);
            }
            debug!("Unparseable {} URL: {}", kind, reference);
        } else if reference.starts_with("file://") || reference.starts_with("content://") {
            return MediaSource::LocalUri(reference.to_string());
        }

        if let Some(asset) = self.assets.lookup(kind, file_name(reference)) {
            return MediaSource::BundledAsset(asset);
        }

        trace!("No {} source for reference {:?}", kind, reference);
        MediaSource::None
    }
}

fn file_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

fn decode_base64(payload: &str) -> Option<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let data = STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(&compact))
        .ok()?;
    (!data.is_empty()).then_some(data)
}

/// Decode the part of a data URL after `data:`, e.g. `image/png;base64,....`
fn decode_data_url(payload: &str) -> Option<(String, Vec<u8>)> {
    let (header, body) = payload.split_once(',')?;
    let mut params = header.split(';');
    let mime = params
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_INLINE_MIME)
        .to_string();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return None;
    }
    decode_base64(body).map(|data| (mime, data))
}

fn host_of(reference: &str) -> Option<String> {
    let parsed = if reference.contains("://") {
        Url::parse(reference).ok()?
    } else {
        Url::parse(&format!("https://{}", reference)).ok()?
    };
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}

/// True when the reference points at a recognized video-hosting domain.
pub fn is_hosted_video_link(reference: &str) -> bool {
    if reference.is_empty() {
        return false;
    }
    let Some(host) = host_of(reference) else {
        return false;
    };
    HOSTED_VIDEO_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

/// Pull the hosted-video id out of a watch (`?v=`) or short (`youtu.be/`) link.
pub fn extract_hosted_video_id(reference: &str) -> Option<String> {
    if let Some((_, rest)) = reference.split_once("v=") {
        let id = rest.split('&').next().unwrap_or_default();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    if let Some((_, rest)) = reference.split_once(HOSTED_SHORT_LINK) {
        let id = rest.split('?').next().unwrap_or_default();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    None
}

fn hosted_embed(video_id: String) -> MediaSource {
    match Url::parse(HOSTED_EMBED_BASE).and_then(|base| base.join(&video_id)) {
        Ok(embed_url) => MediaSource::HostedEmbed {
            video_id,
            embed_url,
        },
        Err(_) => MediaSource::None,
    }
}
