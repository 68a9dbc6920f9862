// Confetti - A wedding media-sharing gallery
// Copyright (C) 2026 Confetti Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! HTTP transport for the media host
//!
//! `MediaTransport` is the seam between the domain client and the wire:
//! production uses the reqwest-backed [`HttpTransport`], tests swap in a
//! scripted mock.

use async_trait::async_trait;
use futures::stream;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use super::error::TransportError;

/// Observer invoked with upload byte progress, 0-100
pub type ProgressObserver = Arc<dyn Fn(u8) + Send + Sync>;

/// Chunk size used while streaming an upload body from disk
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Transport the media host client speaks through
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// POST `file_path` as a multipart form together with `fields`,
    /// reporting byte progress to `progress` while the total size is
    /// measurable. Returns the response body on a success status.
    async fn post_file(
        &self,
        url: &str,
        file_path: &Path,
        fields: &[(String, String)],
        progress: Option<ProgressObserver>,
    ) -> Result<String, TransportError>;

    /// GET `url`, returning the response body on a success status.
    async fn get_json(&self, url: &str) -> Result<String, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a default client
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaTransport for HttpTransport {
    async fn post_file(
        &self,
        url: &str,
        file_path: &Path,
        fields: &[(String, String)],
        progress: Option<ProgressObserver>,
    ) -> Result<String, TransportError> {
        let file = tokio::fs::File::open(file_path).await?;
        let total = file.metadata().await?.len();

        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = mime_guess::from_path(file_path).first_or_octet_stream();

        let body = reqwest::Body::wrap_stream(progress_stream(file, total, progress));
        let part = reqwest::multipart::Part::stream_with_length(body, total)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        form = form.part("file", part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }

    async fn get_json(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

/// Stream a file in chunks, reporting the running byte ratio.
///
/// The observer is only invoked while the total length is measurable
/// (non-zero); percentages are rounded to the nearest integer.
fn progress_stream(
    file: tokio::fs::File,
    total: u64,
    progress: Option<ProgressObserver>,
) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> {
    stream::unfold((file, 0u64), move |(mut file, loaded)| {
        let progress = progress.clone();
        async move {
            let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
            match file.read(&mut buf).await {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    let loaded = loaded + n as u64;
                    if total > 0 {
                        if let Some(observer) = &progress {
                            observer(byte_percent(loaded, total));
                        }
                    }
                    Some((Ok(buf), (file, loaded)))
                }
                Err(e) => Some((Err(e), (file, loaded))),
            }
        }
    })
}

/// Round `loaded / total` to an integer percentage
fn byte_percent(loaded: u64, total: u64) -> u8 {
    ((loaded as f64 / total as f64) * 100.0).round() as u8
}
