// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use scraper::Html;
use url::Url;

use super::consts;
use crate::error::ResolveError;
use crate::quality::Quality;

/// Decode a fetched page into an HTML document
pub(crate) fn parse_document(body: &Bytes, url: &str) -> Result<Html, ResolveError> {
    let text = std::str::from_utf8(body).map_err(|e| ResolveError::MalformedDocument {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Html::parse_document(text))
}

/// Find the numeric content id behind the detail page's play button
pub(crate) fn content_id(document: &Html, url: &str) -> Result<u64, ResolveError> {
    let onclick = document
        .select(&consts::PLAY_BUTTON_SELECTOR)
        .find_map(|button| button.value().attr("onclick"))
        .ok_or_else(|| ResolveError::MissingContentId {
            url: url.to_string(),
        })?;

    parse_play_action(onclick)
}

/// Parse `PlayEpisode('<digits>')` into its digits
pub(crate) fn parse_play_action(action: &str) -> Result<u64, ResolveError> {
    let malformed = || ResolveError::MalformedContentId {
        value: action.to_string(),
    };

    let rest = action
        .strip_prefix(consts::PLAY_EPISODE_PREFIX)
        .ok_or_else(malformed)?;
    let digits = rest
        .len()
        .checked_sub(consts::PLAY_EPISODE_SUFFIX_LEN)
        .and_then(|end| rest.get(..end))
        .ok_or_else(malformed)?;

    digits.parse().map_err(|_| malformed())
}

/// Address of the first hyperlink in document order
pub(crate) fn first_link(document: &Html, url: &str) -> Result<String, ResolveError> {
    let href = document
        .select(&consts::ANCHOR_SELECTOR)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .ok_or_else(|| ResolveError::MissingSearchLink {
            url: url.to_string(),
        })?;

    absolute_link(url, href)
}

/// Link of the first download entry whose label maps to `quality`
pub(crate) fn download_link(
    document: &Html,
    url: &str,
    quality: Quality,
) -> Result<String, ResolveError> {
    let href = document
        .select(&consts::DOWNLOAD_ITEM_SELECTOR)
        .filter(|item| {
            let label: String = item
                .select(&consts::DOWNLOAD_LABEL_SELECTOR)
                .flat_map(|label| label.text())
                .collect();
            Quality::from_label(&label) == quality
        })
        .find_map(|item| {
            item.select(&consts::DOWNLOAD_LINK_SELECTOR)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
        })
        .ok_or_else(|| ResolveError::QualityNotAvailable {
            url: url.to_string(),
            quality,
        })?;

    absolute_link(url, href)
}

/// Resolve `href` against the page it was found on
fn absolute_link(page_url: &str, href: &str) -> Result<String, ResolveError> {
    let malformed = |e: url::ParseError| ResolveError::MalformedDocument {
        url: page_url.to_string(),
        reason: format!("invalid link '{href}': {e}"),
    };

    let base = Url::parse(page_url).map_err(malformed)?;
    Ok(base.join(href.trim()).map_err(malformed)?.to_string())
}
