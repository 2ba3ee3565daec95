pub mod editor;
pub mod filter;
pub mod media;
pub mod roster;

pub use editor::{PlayerEditor, SaveReceipt, UploadHandle, UploadReport};
pub use filter::{FilterCriterion, filter_players};
pub use media::{MediaResolver, MediaSource, extract_hosted_video_id};
pub use roster::{FetchOutcome, RosterChange, RosterLoader, RosterSubscription};
