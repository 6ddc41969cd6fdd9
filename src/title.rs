// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TitleError;

// Feed titles look like "Name (Original Name). Episode Name. (S01E02)".
// Captures are greedy, so a name containing parentheses may be split at the wrong pair.
static TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<name>.+)\((?P<original_name>.+)\)\.\s*(?P<episode_name>.+)\.\s*\(S(?P<season>[0-9]+)E(?P<episode>[0-9]+)\)",
    )
    .unwrap()
});

/// Episode identity extracted from a feed title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeTitle {
    /// Localized series name, as captured (may carry trailing whitespace)
    pub name: String,
    /// Original series name, used for matching against followed shows
    pub original_name: String,
    pub episode_name: String,
    pub season: u8,
    pub episode: u8,
}

impl EpisodeTitle {
    /// Short human readable form, e.g. "Severance S02E05"
    pub fn label(&self) -> String {
        format!(
            "{} S{:02}E{:02}",
            self.original_name, self.season, self.episode
        )
    }
}

/// Parse a raw feed title into an [`EpisodeTitle`]
pub fn parse_title(title: &str) -> Result<EpisodeTitle, TitleError> {
    let captures = TITLE_REGEX
        .captures(title)
        .ok_or_else(|| TitleError::InvalidTitle {
            title: title.to_string(),
        })?;

    let number = |group: &str| -> Result<u8, TitleError> {
        let value = &captures[group];
        value.parse().map_err(|_| TitleError::InvalidEpisodeNumber {
            title: title.to_string(),
            value: value.to_string(),
        })
    };

    Ok(EpisodeTitle {
        name: captures["name"].to_string(),
        original_name: captures["original_name"].to_string(),
        episode_name: captures["episode_name"].to_string(),
        season: number("season")?,
        episode: number("episode")?,
    })
}

/// Canonical feed title for an episode; [`parse_title`] reads it back unchanged
impl fmt::Display for EpisodeTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}). {}. (S{:02}E{:02})",
            self.name, self.original_name, self.episode_name, self.season, self.episode
        )
    }
}
