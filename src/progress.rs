use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Events emitted during a polling tick for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A tick is starting from the given watermark
    TickStarted { watermark: DateTime<Utc> },

    /// Feed is being fetched from URL
    FetchingFeed { url: String },

    /// Feed could not be fetched or parsed; the tick ends here
    FeedFailed { error: String },

    /// Feed has been parsed successfully
    FeedParsed {
        /// Entries in the feed
        total_entries: usize,
        /// Entries whose title is an episode announcement
        episodes: usize,
        /// Episodes published after the watermark
        new_episodes: usize,
    },

    /// A new episode is not on the interest list
    EpisodeSkipped { episode: String },

    /// Resolution of a followed episode is starting
    DispatchStarting { episode: String },

    /// The episode's torrent was handed to the download queue
    DispatchCompleted { episode: String },

    /// Resolving or queueing the episode failed
    DispatchFailed { episode: String, error: String },

    /// The watermark was moved forward and persisted
    WatermarkAdvanced { watermark: DateTime<Utc> },

    /// The watermark moved forward in memory but could not be persisted
    WatermarkPersistFailed { error: String },

    /// Tick finished
    TickCompleted {
        dispatched_count: usize,
        skipped_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events while polling.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
