// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::WatermarkError;

/// Default file name for the persisted watermark
pub const DEFAULT_WATERMARK_FILE: &str = "lastUpdateMarker";

/// Publication time of the newest feed entry already processed
///
/// Persisted as a decimal count of microseconds since the Unix epoch.
/// A missing or unreadable file means nothing has been processed yet.
#[derive(Debug, Clone)]
pub struct Watermark {
    path: PathBuf,
    current: DateTime<Utc>,
}

impl Watermark {
    /// Create a store backed by `path`; nothing is read until [`Watermark::read`]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current watermark, refreshed from disk when the file holds a newer valid value
    pub fn read(&mut self) -> DateTime<Utc> {
        if let Some(persisted) = read_persisted(&self.path) {
            self.current = self.current.max(persisted);
        }
        self.current
    }

    /// Move the watermark forward to `candidate` and persist it
    ///
    /// The in-memory value never moves backwards, and it is kept even when
    /// writing the file fails.
    pub fn advance(&mut self, candidate: DateTime<Utc>) -> Result<DateTime<Utc>, WatermarkError> {
        self.current = self.current.max(candidate);
        write_persisted(&self.path, self.current)?;
        Ok(self.current)
    }
}

fn read_persisted(path: &Path) -> Option<DateTime<Utc>> {
    let content = std::fs::read_to_string(path).ok()?;
    let micros: i64 = content.trim().parse().ok()?;
    DateTime::from_timestamp_micros(micros)
}

/// Written to a `.partial` sibling, then renamed into place
fn write_persisted(path: &Path, value: DateTime<Utc>) -> Result<(), WatermarkError> {
    let persist_failed = |e| WatermarkError::PersistFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    std::fs::write(&partial, value.timestamp_micros().to_string()).map_err(persist_failed)?;
    std::fs::rename(&partial, path).map_err(persist_failed)
}
