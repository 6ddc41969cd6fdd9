// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::FeedError;
use crate::title::{EpisodeTitle, parse_title};

/// Path segment the feed adds to links that the detail pages don't use
const MOBILE_SEGMENT: &str = "mr/";

/// One announcement from the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
}

/// An episode announcement with a parsed title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub title: EpisodeTitle,
    pub published: DateTime<Utc>,
    /// Address of the episode's detail page, the starting point for resolution
    pub detail_url: String,
}

/// Parse RSS feed XML bytes into feed entries
///
/// Items without a title, link or readable publication date are dropped.
pub fn parse_feed(xml_bytes: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let channel = rss::Channel::read_from(xml_bytes)?;

    Ok(channel.items().iter().filter_map(parse_entry).collect())
}

fn parse_entry(item: &rss::Item) -> Option<FeedEntry> {
    let published = item.pub_date().and_then(|date_str| {
        DateTime::parse_from_rfc2822(date_str)
            .or_else(|_| parse_relaxed_date(date_str))
            .ok()
    })?;

    Some(FeedEntry {
        title: item.title()?.to_string(),
        link: item.link()?.to_string(),
        published: published.with_timezone(&Utc),
    })
}

/// Try to parse dates that don't strictly conform to RFC 2822
fn parse_relaxed_date(date_str: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let formats = [
        "%a, %d %b %Y %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%d %H:%M:%S %z",
    ];

    for format in formats {
        if let Ok(dt) = DateTime::parse_from_str(date_str.trim(), format) {
            return Ok(dt);
        }
    }

    DateTime::parse_from_rfc3339(date_str.trim())
}

/// Turn feed entries into episodes, silently skipping titles that don't parse
pub fn episodes_from_entries(entries: Vec<FeedEntry>) -> Vec<Episode> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let title = parse_title(&entry.title).ok()?;
            Some(Episode {
                title,
                published: entry.published,
                detail_url: entry.link.replacen(MOBILE_SEGMENT, "", 1),
            })
        })
        .collect()
}
