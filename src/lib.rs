pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod poll;
pub mod progress;
pub mod quality;
pub mod queue;
pub mod resolve;
pub mod title;
pub mod watermark;

// Re-export main types for convenience
pub use config::{parse_interval, transmission_url};
pub use error::{
    ConfigError, DispatchError, FeedError, HttpError, PollError, QueueError, ResolveError,
    TitleError, WatermarkError,
};
pub use feed::{Episode, FeedEntry, episodes_from_entries, fetch_feed, parse_feed};
pub use http::{HttpClient, HttpResponse, ReqwestClient, fetch_bytes};
pub use poll::{InterestSet, PollOptions, PollResult, poll_once};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use quality::Quality;
pub use queue::{DirectoryQueue, DownloadQueue, TransmissionQueue};
pub use resolve::Resolver;
pub use title::{EpisodeTitle, parse_title};
pub use watermark::{DEFAULT_WATERMARK_FILE, Watermark};
