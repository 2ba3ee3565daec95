// Defaults shared by the config layer and the services

// === Roster ===
pub const DEFAULT_COLLECTION: &str = "players";
pub const DEFAULT_PAGE_SIZE: usize = 10;
// Firestore REST has no push channel, so the live page is refreshed by polling
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

// === Media ===
pub const INLINE_PHOTO_WIDTH: u32 = 256;
pub const INLINE_PHOTO_QUALITY: u8 = 70;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;
pub const PHOTO_STORAGE_PREFIX: &str = "players/photos";
pub const VIDEO_STORAGE_PREFIX: &str = "players/videos";

// === Hosted video ===
pub const HOSTED_VIDEO_DOMAINS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];
pub const HOSTED_SHORT_LINK: &str = "youtu.be/";
pub const HOSTED_EMBED_BASE: &str = "https://www.youtube.com/embed/";

// === HTTP ===
pub const HTTP_TIMEOUT_SECS: u64 = 30;
