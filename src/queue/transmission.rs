// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

use super::DownloadQueue;
use crate::error::QueueError;

/// Header carrying Transmission's CSRF token
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

#[derive(Serialize)]
struct RpcRequest<'a> {
    method: &'static str,
    arguments: TorrentAdd<'a>,
}

#[derive(Serialize)]
struct TorrentAdd<'a> {
    metainfo: String,
    #[serde(rename = "download-dir")]
    download_dir: &'a str,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: String,
}

/// Queues torrents on a Transmission daemon through its JSON-RPC interface
pub struct TransmissionQueue {
    client: reqwest::Client,
    rpc_url: Url,
    credentials: Option<(String, String)>,
    session_id: Mutex<Option<String>>,
}

impl TransmissionQueue {
    pub fn new(rpc_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), rpc_url)
    }

    pub fn with_client(client: reqwest::Client, rpc_url: Url) -> Self {
        Self {
            client,
            rpc_url,
            credentials: None,
            session_id: Mutex::new(None),
        }
    }

    /// Authenticate with HTTP basic auth
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    async fn post(&self, request: &RpcRequest<'_>) -> Result<reqwest::Response, QueueError> {
        let mut builder = self.client.post(self.rpc_url.clone()).json(request);

        if let Some((username, password)) = &self.credentials {
            builder = builder.basic_auth(username, Some(password));
        }
        if let Some(session_id) = self.session_id.lock().await.as_deref() {
            builder = builder.header(SESSION_ID_HEADER, session_id);
        }

        builder.send().await.map_err(|e| QueueError::RequestFailed {
            url: self.rpc_url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl DownloadQueue for TransmissionQueue {
    async fn add(&self, torrent: &[u8], download_path: &str) -> Result<(), QueueError> {
        let request = RpcRequest {
            method: "torrent-add",
            arguments: TorrentAdd {
                metainfo: STANDARD.encode(torrent),
                download_dir: download_path,
            },
        };

        let mut response = self.post(&request).await?;

        // Transmission answers 409 with a fresh session id until we echo it back
        if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| QueueError::MissingSessionId {
                    url: self.rpc_url.to_string(),
                })?;
            *self.session_id.lock().await = Some(session_id.to_string());

            response = self.post(&request).await?;
        }

        if !response.status().is_success() {
            return Err(QueueError::Status {
                url: self.rpc_url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: RpcResponse = response.json().await.map_err(|e| QueueError::RequestFailed {
            url: self.rpc_url.to_string(),
            source: e,
        })?;

        if body.result == "success" {
            Ok(())
        } else {
            Err(QueueError::Rejected {
                result: body.result,
            })
        }
    }
}
