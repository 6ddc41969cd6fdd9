// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::DownloadQueue;
use crate::error::QueueError;

/// Saves torrent files into the download path, for clients watching a folder
///
/// Files are named after the SHA-256 of their content, so queueing the same
/// torrent twice rewrites one file instead of creating a duplicate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryQueue;

impl DirectoryQueue {
    /// File a torrent would be written to
    pub fn torrent_path(torrent: &[u8], download_path: &Path) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(torrent);
        download_path.join(format!("{:x}.torrent", hasher.finalize()))
    }
}

#[async_trait]
impl DownloadQueue for DirectoryQueue {
    async fn add(&self, torrent: &[u8], download_path: &str) -> Result<(), QueueError> {
        let dir = Path::new(download_path);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| QueueError::WriteFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let path = Self::torrent_path(torrent, dir);
        let partial = path.with_extension("torrent.partial");

        tokio::fs::write(&partial, torrent)
            .await
            .map_err(|e| QueueError::WriteFailed {
                path: partial.clone(),
                source: e,
            })?;

        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|e| QueueError::WriteFailed { path, source: e })
    }
}
