// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::cookie::Jar;
use url::Url;

use crate::error::HttpError;

/// Name of the cookie carrying the site session
pub const SESSION_COOKIE: &str = "lf_session";

/// HTTP response with status and fully buffered body
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Bytes,
}

/// HTTP client abstraction for testability
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request and buffer the whole response
    async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        (**self).get(url).await
    }
}

/// Fetch a URL, treating transport failures and non-2xx statuses as errors
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Bytes, HttpError> {
    let response = client
        .get(url)
        .await
        .map_err(|e| HttpError::RequestFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !(200..300).contains(&response.status) {
        return Err(HttpError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(response.body)
}

/// Default HTTP client implementation using reqwest
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new ReqwestClient with default settings
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a client that sends the session cookie to every host under `site_url`'s domain
    pub fn with_session(site_url: &Url, session: &str) -> Result<Self, reqwest::Error> {
        let jar = Jar::default();
        let host = site_url.host_str().unwrap_or_default();
        let domain = host.strip_prefix("www.").unwrap_or(host);
        jar.add_cookie_str(
            &format!("{SESSION_COOKIE}={session}; Domain=.{domain}; Path=/"),
            site_url,
        );

        let client = reqwest::Client::builder()
            .cookie_provider(Arc::new(jar))
            .build()?;

        Ok(Self { client })
    }

    /// Create a new ReqwestClient with a custom reqwest::Client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpResponse { status, body })
    }
}
