// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

/// Video quality of a downloadable torrent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Sd,
    Hd,
    FullHd,
    Unknown,
}

impl Quality {
    /// Map a user configuration value ("sd", "hd", "fullhd") to a quality
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything else maps to [`Quality::Unknown`].
    pub fn from_config(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "sd" => Self::Sd,
            "hd" => Self::Hd,
            "fullhd" => Self::FullHd,
            _ => Self::Unknown,
        }
    }

    /// Map a label scraped from a download list ("sd", "mp4", "1080") to a quality
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "sd" => Self::Sd,
            "mp4" => Self::Hd,
            "1080" => Self::FullHd,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sd => "SD",
            Self::Hd => "HD",
            Self::FullHd => "FullHD",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}
