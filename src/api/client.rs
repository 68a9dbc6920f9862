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

//! Media host API client implementation

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::log_api_call;
use crate::models::{MediaEntry, MediaKind, UploadResult};

use super::converter;
use super::error::{FetchError, UploadError};
use super::transport::{HttpTransport, MediaTransport, ProgressObserver};

/// Base URL of the media host upload API
pub(crate) const API_BASE: &str = "https://api.cloudinary.com/v1_1";
/// Base URL of the media host delivery CDN (listing and display URLs)
pub(crate) const DELIVERY_BASE: &str = "https://res.cloudinary.com";
/// Tag applied to every upload and used to list gallery media
pub const MEDIA_TAG: &str = "wedding";

/// Environment variable naming the media host account
pub const ACCOUNT_ENV: &str = "CONFETTI_MEDIA_ACCOUNT";
/// Environment variable naming the unauthenticated upload preset
pub const UPLOAD_PRESET_ENV: &str = "CONFETTI_UPLOAD_PRESET";

/// Media host configuration
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    /// Media host account name
    pub account: String,
    /// Pre-shared unauthenticated upload preset
    pub upload_preset: String,
}

impl HostConfig {
    /// Read the configuration from the environment, degrading to empty
    /// strings when unset (requests will then fail against the real host).
    pub fn from_env() -> Self {
        Self {
            account: std::env::var(ACCOUNT_ENV).unwrap_or_default(),
            upload_preset: std::env::var(UPLOAD_PRESET_ENV).unwrap_or_default(),
        }
    }
}

/// Media host API client
pub struct MediaHostClient {
    transport: Arc<dyn MediaTransport>,
    config: HostConfig,
}

impl MediaHostClient {
    /// Create a client backed by the HTTP transport
    pub fn new(config: HostConfig) -> Self {
        Self {
            transport: Arc::new(HttpTransport::new()),
            config,
        }
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: HostConfig, transport: Arc<dyn MediaTransport>) -> Self {
        Self { transport, config }
    }

    /// Upload a single file, streaming byte progress to `on_progress`.
    ///
    /// The kind is inferred from the file's MIME type; caption and submitter
    /// name travel in the host's context metadata.
    pub async fn upload(
        &self,
        file_path: &Path,
        on_progress: Option<ProgressObserver>,
        caption: Option<&str>,
        submitter_name: Option<&str>,
    ) -> Result<UploadResult, UploadError> {
        if !file_path.exists() {
            return Err(UploadError::FileNotFound(file_path.display().to_string()));
        }

        let kind = MediaKind::from_path(file_path);
        let url = format!(
            "{}/{}/{}/upload",
            API_BASE,
            self.config.account,
            kind.as_str()
        );

        let mut fields = vec![
            ("upload_preset".to_string(), self.config.upload_preset.clone()),
            ("tags".to_string(), MEDIA_TAG.to_string()),
        ];
        if let Some(context) = build_context(caption, submitter_name) {
            fields.push(("context".to_string(), context));
        }

        log_api_call!("POST", &url);
        let started = Instant::now();

        let body = self
            .transport
            .post_file(&url, file_path, &fields, on_progress)
            .await?;

        log_api_call!("POST", &url, started.elapsed().as_millis() as u64);

        let result = converter::upload_result_from_json(&body, kind)?;
        info!("Media uploaded: {}", result.host_id);
        Ok(result)
    }

    /// List media of one kind; best-effort, an empty list on any failure.
    pub async fn list_by_tag(&self, kind: MediaKind) -> Vec<MediaEntry> {
        match self.try_list_by_tag(kind).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to fetch {}s from media host: {}", kind.as_str(), e);
                Vec::new()
            }
        }
    }

    /// List media of one kind, propagating failures to the caller.
    pub async fn try_list_by_tag(&self, kind: MediaKind) -> Result<Vec<MediaEntry>, FetchError> {
        let url = format!(
            "{}/{}/{}/list/{}.json",
            DELIVERY_BASE,
            self.config.account,
            kind.as_str(),
            urlencoding::encode(MEDIA_TAG)
        );

        log_api_call!("GET", &url);

        let body = self
            .transport
            .get_json(&url)
            .await
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        converter::entries_from_listing(&body, &self.config.account, kind)
            .map_err(|e| FetchError::Unavailable(format!("unexpected listing body: {}", e)))
    }

    /// Fetch every gallery entry, listing both kinds concurrently.
    ///
    /// A single failed kind degrades to zero results of that kind; the call
    /// fails only when both listings fail. Zero total results is a valid,
    /// non-error state.
    pub async fn fetch_all(&self) -> Result<Vec<MediaEntry>, FetchError> {
        let (images, videos) = futures::future::join(
            self.try_list_by_tag(MediaKind::Image),
            self.try_list_by_tag(MediaKind::Video),
        )
        .await;

        match (images, videos) {
            (Ok(mut images), Ok(videos)) => {
                images.extend(videos);
                Ok(images)
            }
            (Ok(images), Err(e)) => {
                warn!("Failed to fetch videos from media host: {}", e);
                Ok(images)
            }
            (Err(e), Ok(videos)) => {
                warn!("Failed to fetch images from media host: {}", e);
                Ok(videos)
            }
            (Err(image_err), Err(video_err)) => Err(FetchError::Unavailable(format!(
                "images: {}; videos: {}",
                image_err, video_err
            ))),
        }
    }
}

/// Build the `key=value|key=value` context string stored alongside an
/// upload. `None` when neither field is present.
fn build_context(caption: Option<&str>, submitter_name: Option<&str>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(caption) = caption.filter(|c| !c.is_empty()) {
        parts.push(format!("caption={}", caption));
    }
    if let Some(name) = submitter_name.filter(|n| !n.is_empty()) {
        parts.push(format!("submitter_name={}", name));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::error::TransportError;
    use super::super::transport::mock::MockTransport;
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    fn test_config() -> HostConfig {
        HostConfig {
            account: "demo-cloud".to_string(),
            upload_preset: "unsigned-preset".to_string(),
        }
    }

    fn temp_media_file(name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not really pixels").unwrap();
        (dir, path)
    }

    #[test]
    fn context_joins_only_present_fields() {
        assert_eq!(
            build_context(Some("Hello"), Some("Ana")).as_deref(),
            Some("caption=Hello|submitter_name=Ana")
        );
        assert_eq!(
            build_context(Some("Hello"), None).as_deref(),
            Some("caption=Hello")
        );
        assert_eq!(
            build_context(None, Some("Ana")).as_deref(),
            Some("submitter_name=Ana")
        );
        assert_eq!(build_context(None, None), None);
        assert_eq!(build_context(Some(""), Some("")), None);
    }

    #[tokio::test]
    async fn upload_posts_preset_tag_and_context() {
        let (_dir, path) = temp_media_file("photo.jpg");
        let transport = Arc::new(MockTransport::new());
        transport.push_upload(Ok(r#"{
            "public_id": "wedding/abc123",
            "secure_url": "https://res.cloudinary.com/demo-cloud/image/upload/wedding/abc123",
            "width": 800,
            "height": 600,
            "resource_type": "image"
        }"#
        .to_string()));

        let client = MediaHostClient::with_transport(test_config(), transport.clone());
        let result = client
            .upload(&path, None, Some("Hello"), Some("Ana"))
            .await
            .unwrap();

        assert_eq!(result.host_id, "wedding/abc123");
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);
        assert_eq!(result.kind, MediaKind::Image);

        let uploads = transport.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(
            uploads[0].url,
            "https://api.cloudinary.com/v1_1/demo-cloud/image/upload"
        );
        assert!(uploads[0]
            .fields
            .contains(&("upload_preset".to_string(), "unsigned-preset".to_string())));
        assert!(uploads[0]
            .fields
            .contains(&("tags".to_string(), "wedding".to_string())));
        assert!(uploads[0].fields.contains(&(
            "context".to_string(),
            "caption=Hello|submitter_name=Ana".to_string()
        )));
    }

    #[tokio::test]
    async fn upload_routes_videos_to_the_video_endpoint() {
        let (_dir, path) = temp_media_file("clip.mp4");
        let transport = Arc::new(MockTransport::new());
        transport.push_upload(Ok(r#"{
            "public_id": "wedding/vid1",
            "secure_url": "https://res.cloudinary.com/demo-cloud/video/upload/wedding/vid1",
            "width": 1920,
            "height": 1080,
            "resource_type": "video"
        }"#
        .to_string()));

        let client = MediaHostClient::with_transport(test_config(), transport.clone());
        let result = client.upload(&path, None, None, None).await.unwrap();

        assert_eq!(result.kind, MediaKind::Video);
        assert_eq!(
            transport.uploads.lock().unwrap()[0].url,
            "https://api.cloudinary.com/v1_1/demo-cloud/video/upload"
        );
    }

    #[tokio::test]
    async fn upload_forwards_transport_progress() {
        let (_dir, path) = temp_media_file("photo.jpg");
        let transport = Arc::new(MockTransport::with_progress_script(vec![10, 55, 100]));
        transport.push_upload(Ok(r#"{
            "public_id": "wedding/abc",
            "secure_url": "https://res.cloudinary.com/demo-cloud/image/upload/wedding/abc",
            "width": 100,
            "height": 100
        }"#
        .to_string()));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer: ProgressObserver = Arc::new(move |p| sink.lock().unwrap().push(p));

        let client = MediaHostClient::with_transport(test_config(), transport);
        client.upload(&path, Some(observer), None, None).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![10, 55, 100]);
    }

    #[tokio::test]
    async fn upload_of_a_missing_file_fails_without_a_request() {
        let transport = Arc::new(MockTransport::new());
        let client = MediaHostClient::with_transport(test_config(), transport.clone());

        let err = client
            .upload(Path::new("/nonexistent/photo.jpg"), None, None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::FileNotFound(_)));
        assert!(transport.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_upload_surfaces_the_status() {
        let (_dir, path) = temp_media_file("photo.jpg");
        let transport = Arc::new(MockTransport::new());
        transport.push_upload(Err(TransportError::Status(401)));

        let client = MediaHostClient::with_transport(test_config(), transport);
        let err = client.upload(&path, None, None, None).await.unwrap_err();

        assert!(matches!(err, UploadError::Rejected(401)));
    }

    #[tokio::test]
    async fn listing_is_best_effort_per_kind() {
        let transport = Arc::new(MockTransport::new());
        transport.set_listing("image", Err(TransportError::Status(404)));

        let client = MediaHostClient::with_transport(test_config(), transport);
        assert!(client.list_by_tag(MediaKind::Image).await.is_empty());
    }

    #[tokio::test]
    async fn fetch_all_concatenates_images_before_videos() {
        let transport = Arc::new(MockTransport::new());
        transport.set_listing(
            "image",
            Ok(r#"{"resources": [{"public_id": "wedding/img1", "width": 800, "height": 600}]}"#
                .to_string()),
        );
        transport.set_listing(
            "video",
            Ok(r#"{"resources": [{"public_id": "wedding/vid1"}]}"#.to_string()),
        );

        let client = MediaHostClient::with_transport(test_config(), transport);
        let entries = client.fetch_all().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "wedding/img1");
        assert_eq!(entries[0].kind, MediaKind::Image);
        assert_eq!(entries[1].id, "wedding/vid1");
        assert_eq!(entries[1].kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn fetch_all_tolerates_one_failed_kind() {
        let transport = Arc::new(MockTransport::new());
        transport.set_listing(
            "image",
            Ok(r#"{"resources": [{"public_id": "wedding/img1"}]}"#.to_string()),
        );
        transport.set_listing("video", Err(TransportError::Network("timeout".to_string())));

        let client = MediaHostClient::with_transport(test_config(), transport);
        let entries = client.fetch_all().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "wedding/img1");
    }

    #[tokio::test]
    async fn fetch_all_fails_only_when_both_kinds_fail() {
        let transport = Arc::new(MockTransport::new());
        transport.set_listing("image", Err(TransportError::Status(500)));
        transport.set_listing("video", Err(TransportError::Network("timeout".to_string())));

        let client = MediaHostClient::with_transport(test_config(), transport);
        assert!(client.fetch_all().await.is_err());
    }

    #[tokio::test]
    async fn fetch_all_with_no_media_is_not_an_error() {
        let transport = Arc::new(MockTransport::new());
        transport.set_listing("image", Ok(r#"{"resources": []}"#.to_string()));
        transport.set_listing("video", Ok(r#"{"resources": []}"#.to_string()));

        let client = MediaHostClient::with_transport(test_config(), transport);
        assert!(client.fetch_all().await.unwrap().is_empty());
    }
}
