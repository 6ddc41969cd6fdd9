// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod directory;
mod transmission;

use async_trait::async_trait;

use crate::error::QueueError;

pub use directory::DirectoryQueue;
pub use transmission::{SESSION_ID_HEADER, TransmissionQueue};

/// Destination for resolved torrent files
#[async_trait]
pub trait DownloadQueue: Send + Sync {
    /// Queue a torrent whose content should be downloaded into `download_path`
    async fn add(&self, torrent: &[u8], download_path: &str) -> Result<(), QueueError>;
}
