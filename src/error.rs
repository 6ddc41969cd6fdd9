// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

use crate::quality::Quality;

/// Errors raised by a single HTTP fetch
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed for {url}: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Errors that can occur when fetching or parsing the episode feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed: {0}")]
    FetchFailed(#[from] HttpError),

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),
}

/// Reasons a feed title could not be turned into an episode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    #[error("Title does not look like an episode announcement: '{title}'")]
    InvalidTitle { title: String },

    #[error("Invalid season or episode number '{value}' in '{title}'")]
    InvalidEpisodeNumber { title: String, value: String },
}

/// Errors that abort the resolution of one episode
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No content id found on detail page {url}")]
    MissingContentId { url: String },

    #[error("Malformed content id '{value}'")]
    MalformedContentId { value: String },

    #[error("No link found on search page {url}")]
    MissingSearchLink { url: String },

    #[error("No {quality} download offered on {url}")]
    QualityNotAvailable { url: String, quality: Quality },

    #[error("Failed to fetch torrent file: {source}")]
    ArtifactFetchFailed {
        #[source]
        source: HttpError,
    },

    #[error("Network error: {0}")]
    Network(#[from] HttpError),

    #[error("Malformed document at {url}: {reason}")]
    MalformedDocument { url: String, reason: String },
}

/// Errors raised while persisting the watermark
#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("Failed to persist watermark to {path}: {source}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by a download queue
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("RPC request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("RPC error {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("RPC endpoint {url} asked for a session id but did not provide one")]
    MissingSessionId { url: String },

    #[error("Torrent was rejected: {result}")]
    Rejected { result: String },

    #[error("Failed to write torrent file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single episode's resolve-and-enqueue step
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Download queue failed: {0}")]
    Queue(#[from] QueueError),
}

/// Errors that abort a whole polling tick
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Errors in user supplied configuration values
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid interval '{value}': {reason}")]
    InvalidInterval { value: String, reason: String },

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}
