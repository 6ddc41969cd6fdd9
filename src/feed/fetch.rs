// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::FeedError;
use crate::http::{HttpClient, fetch_bytes};

use super::parse::{FeedEntry, parse_feed};

/// Fetch and parse the episode feed from a URL
pub async fn fetch_feed<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Vec<FeedEntry>, FeedError> {
    let bytes = fetch_bytes(client, url).await?;
    parse_feed(&bytes)
}
