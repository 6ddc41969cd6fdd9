// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod consts;
mod extract;

use bytes::Bytes;
use url::Url;

use crate::error::ResolveError;
use crate::http::{HttpClient, fetch_bytes};
use crate::quality::Quality;

/// Turns an episode's detail page into torrent file bytes
///
/// The site hides the torrent behind three pages: the detail page carries a
/// numeric content id, the search endpoint redirects that id to a download
/// list, and the list offers one torrent per quality. Each hop needs the
/// previous one's output, so they run strictly in sequence and the first
/// failure ends the resolution.
#[derive(Clone)]
pub struct Resolver<C> {
    client: C,
    site_url: Url,
}

impl<C: HttpClient> Resolver<C> {
    pub fn new(client: C, site_url: Url) -> Self {
        Self { client, site_url }
    }

    /// Fetch the torrent file of the requested quality for an episode
    pub async fn resolve(&self, detail_url: &str, quality: Quality) -> Result<Bytes, ResolveError> {
        let content_id = self.content_id(detail_url).await?;
        let list_url = self.download_list_url(content_id).await?;
        self.fetch_torrent(&list_url, quality).await
    }

    /// Address of the search endpoint for a content id
    pub fn search_url(&self, content_id: u64) -> String {
        format!(
            "{}/v_search.php?a={}",
            self.site_url.as_str().trim_end_matches('/'),
            content_id
        )
    }

    async fn content_id(&self, detail_url: &str) -> Result<u64, ResolveError> {
        let body = fetch_bytes(&self.client, detail_url).await?;
        let document = extract::parse_document(&body, detail_url)?;
        extract::content_id(&document, detail_url)
    }

    async fn download_list_url(&self, content_id: u64) -> Result<String, ResolveError> {
        let search_url = self.search_url(content_id);
        let body = fetch_bytes(&self.client, &search_url).await?;
        let document = extract::parse_document(&body, &search_url)?;
        extract::first_link(&document, &search_url)
    }

    async fn fetch_torrent(&self, list_url: &str, quality: Quality) -> Result<Bytes, ResolveError> {
        let body = fetch_bytes(&self.client, list_url).await?;
        let torrent_url = {
            let document = extract::parse_document(&body, list_url)?;
            extract::download_link(&document, list_url, quality)?
        };

        fetch_bytes(&self.client, &torrent_url)
            .await
            .map_err(|source| ResolveError::ArtifactFetchFailed { source })
    }
}
