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

//! IPC message handler

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::api::{HostConfig, MediaHostClient, UploadError};
use crate::cache::SettingsStore;
use crate::gallery::GalleryStore;
use crate::log_ipc;
use crate::models::{
    error_codes, methods, IpcError, IpcMessage, Severity, DEFAULT_AUTO_DISMISS_MS,
};
use crate::notify::NotificationBroker;
use crate::upload::{StagingArea, UploadCoordinator};
use crate::visibility::{TrackerConfig, VisibilityTracker};

/// Handles incoming IPC messages and routes them to the owning component
pub struct MessageHandler {
    client: Arc<MediaHostClient>,
    gallery: Arc<GalleryStore>,
    notifier: Arc<NotificationBroker>,
    coordinator: Arc<UploadCoordinator>,
    staging: RwLock<StagingArea>,
    tracker: RwLock<VisibilityTracker>,
    settings: SettingsStore,
    shutdown: broadcast::Sender<()>,
}

impl MessageHandler {
    /// Create a handler wired to the production components
    pub async fn new(
        events: broadcast::Sender<IpcMessage>,
        shutdown: broadcast::Sender<()>,
    ) -> Result<Self> {
        let client = Arc::new(MediaHostClient::new(HostConfig::from_env()));
        let settings = SettingsStore::new().await?;
        let staging = StagingArea::new()?;
        Ok(Self::assemble(client, settings, staging, events, shutdown))
    }

    pub(crate) fn assemble(
        client: Arc<MediaHostClient>,
        settings: SettingsStore,
        staging: StagingArea,
        events: broadcast::Sender<IpcMessage>,
        shutdown: broadcast::Sender<()>,
    ) -> Self {
        let notifier = Arc::new(NotificationBroker::with_events(events.clone()));
        let gallery = Arc::new(GalleryStore::new());
        let coordinator = Arc::new(UploadCoordinator::with_events(
            client.clone(),
            gallery.clone(),
            notifier.clone(),
            events,
        ));

        Self {
            client,
            gallery,
            notifier,
            coordinator,
            staging: RwLock::new(staging),
            tracker: RwLock::new(VisibilityTracker::new(TrackerConfig::default())),
            settings,
            shutdown,
        }
    }

    /// Handle an incoming IPC message
    pub async fn handle_message(&self, msg: IpcMessage) -> IpcMessage {
        let method = msg.method.as_deref().unwrap_or("unknown");
        log_ipc!(request, method, &msg.id);

        let result = match method {
            // System methods
            methods::PING => self.handle_ping(&msg).await,
            methods::SHUTDOWN => self.handle_shutdown(&msg).await,

            // Gallery methods
            methods::GALLERY_GET => self.handle_gallery_get(&msg).await,
            methods::GALLERY_GET_SORTED => self.handle_gallery_get_sorted(&msg).await,
            methods::GALLERY_REFRESH => self.handle_gallery_refresh(&msg).await,

            // Media staging and upload methods
            methods::MEDIA_STAGE => self.handle_media_stage(&msg).await,
            methods::MEDIA_UNSTAGE => self.handle_media_unstage(&msg).await,
            methods::MEDIA_STAGED => self.handle_media_staged(&msg).await,
            methods::MEDIA_CLEAR_STAGED => self.handle_media_clear_staged(&msg).await,
            methods::MEDIA_UPLOAD => self.handle_media_upload(&msg).await,
            methods::MEDIA_UPLOAD_BATCH => self.handle_media_upload_batch(&msg).await,
            methods::UPLOAD_STATE => self.handle_upload_state(&msg).await,

            // Notification methods
            methods::NOTIFICATIONS_LIST => self.handle_notifications_list(&msg).await,
            methods::NOTIFICATIONS_SHOW => self.handle_notifications_show(&msg).await,
            methods::NOTIFICATIONS_DISMISS => self.handle_notifications_dismiss(&msg).await,

            // Viewport methods
            methods::VIEWPORT_CONFIGURE => self.handle_viewport_configure(&msg).await,
            methods::VIEWPORT_REGISTER => self.handle_viewport_register(&msg).await,
            methods::VIEWPORT_UNREGISTER => self.handle_viewport_unregister(&msg).await,
            methods::VIEWPORT_REPORT => self.handle_viewport_report(&msg).await,
            methods::VIEWPORT_QUERY => self.handle_viewport_query(&msg).await,
            methods::VIEWPORT_RESET => self.handle_viewport_reset(&msg).await,

            // Settings methods
            methods::SETTINGS_GET => self.handle_settings_get(&msg).await,
            methods::SETTINGS_SET => self.handle_settings_set(&msg).await,

            // Unknown method
            _ => {
                warn!("Unknown method: {}", method);
                IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(
                        error_codes::METHOD_NOT_FOUND,
                        format!("Unknown method: {}", method),
                    ),
                )
            }
        };

        let success = result.error.is_none();
        log_ipc!(response, method, &msg.id, success);

        result
    }

    /// Handle ping request
    async fn handle_ping(&self, msg: &IpcMessage) -> IpcMessage {
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({
                "pong": true,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }),
        )
    }

    /// Handle shutdown request
    async fn handle_shutdown(&self, msg: &IpcMessage) -> IpcMessage {
        info!("Shutdown requested via IPC");
        let _ = self.shutdown.send(());
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({
                "status": "shutting_down"
            }),
        )
    }

    async fn handle_gallery_get(&self, msg: &IpcMessage) -> IpcMessage {
        self.gallery.ensure_loaded(&self.client, &self.notifier).await;
        let entries = self.gallery.all().await;
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({
                "total": entries.len(),
                "entries": entries,
            }),
        )
    }

    async fn handle_gallery_get_sorted(&self, msg: &IpcMessage) -> IpcMessage {
        self.gallery.ensure_loaded(&self.client, &self.notifier).await;
        let entries = self.gallery.sorted_by_recency().await;
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({
                "total": entries.len(),
                "entries": entries,
            }),
        )
    }

    async fn handle_gallery_refresh(&self, msg: &IpcMessage) -> IpcMessage {
        let refreshed = self.gallery.refresh(&self.client, &self.notifier).await;
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({
                "refreshed": refreshed,
                "total": self.gallery.len().await,
            }),
        )
    }

    async fn handle_media_stage(&self, msg: &IpcMessage) -> IpcMessage {
        let params = match &msg.params {
            Some(p) => p,
            None => return missing_params(&msg.id),
        };

        let file_path = match params.get("file_path").and_then(|v| v.as_str()) {
            Some(path) => path,
            None => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing file_path"),
                );
            }
        };

        match self.staging.write().await.stage(Path::new(file_path)) {
            Ok(pending) => IpcMessage::response_ok(&msg.id, serde_json::json!(pending)),
            Err(e) => upload_error_response(&msg.id, &e),
        }
    }

    async fn handle_media_unstage(&self, msg: &IpcMessage) -> IpcMessage {
        let id = match msg.params.as_ref().and_then(|p| p.get("id")).and_then(|v| v.as_str()) {
            Some(id) => id,
            None => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing id"),
                );
            }
        };

        let mut staging = self.staging.write().await;
        staging.remove(id);
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({ "remaining": staging.len() }),
        )
    }

    async fn handle_media_staged(&self, msg: &IpcMessage) -> IpcMessage {
        let staging = self.staging.read().await;
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({ "files": staging.files() }),
        )
    }

    async fn handle_media_clear_staged(&self, msg: &IpcMessage) -> IpcMessage {
        self.staging.write().await.clear();
        IpcMessage::response_ok(&msg.id, serde_json::json!({ "remaining": 0 }))
    }

    async fn handle_media_upload(&self, msg: &IpcMessage) -> IpcMessage {
        let params = match &msg.params {
            Some(p) => p,
            None => return missing_params(&msg.id),
        };

        let file_path = match params.get("file_path").and_then(|v| v.as_str()) {
            Some(path) => path.to_string(),
            None => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing file_path"),
                );
            }
        };

        let caption = params
            .get("caption")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let submitter_name = self.resolve_submitter_name(params).await;

        match self
            .coordinator
            .submit_one(Path::new(&file_path), caption, submitter_name)
            .await
        {
            Ok(entry) => IpcMessage::response_ok(&msg.id, serde_json::json!(entry)),
            Err(e) => upload_error_response(&msg.id, &e),
        }
    }

    async fn handle_media_upload_batch(&self, msg: &IpcMessage) -> IpcMessage {
        let params = match &msg.params {
            Some(p) => p,
            None => return missing_params(&msg.id),
        };

        let use_staged = params
            .get("staged")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let files: Vec<PathBuf> = if use_staged {
            self.staging.read().await.paths()
        } else {
            match params.get("file_paths").and_then(|v| v.as_array()) {
                Some(paths) => paths
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(PathBuf::from)
                    .collect(),
                None => {
                    return IpcMessage::response_err(
                        &msg.id,
                        IpcError::new(error_codes::INVALID_PARAMS, "Missing file_paths"),
                    );
                }
            }
        };

        if files.is_empty() {
            return IpcMessage::response_err(
                &msg.id,
                IpcError::new(error_codes::INVALID_PARAMS, "No files to upload"),
            );
        }

        let caption = params
            .get("caption")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let submitter_name = self.resolve_submitter_name(params).await;

        match self
            .coordinator
            .submit_many(&files, caption, submitter_name)
            .await
        {
            Ok(entries) => {
                // Staged files are consumed by a successful submit; their
                // previews are released here. A failed submit keeps them so
                // the user can retry.
                if use_staged {
                    self.staging.write().await.clear();
                }
                IpcMessage::response_ok(
                    &msg.id,
                    serde_json::json!({
                        "total": entries.len(),
                        "entries": entries,
                    }),
                )
            }
            Err(e) => upload_error_response(&msg.id, &e),
        }
    }

    async fn handle_upload_state(&self, msg: &IpcMessage) -> IpcMessage {
        let session = self.coordinator.session().await;
        IpcMessage::response_ok(&msg.id, serde_json::json!(session))
    }

    async fn handle_notifications_list(&self, msg: &IpcMessage) -> IpcMessage {
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({ "notifications": self.notifier.active() }),
        )
    }

    async fn handle_notifications_show(&self, msg: &IpcMessage) -> IpcMessage {
        let params = match &msg.params {
            Some(p) => p,
            None => return missing_params(&msg.id),
        };

        let severity = match params.get("severity").and_then(|v| v.as_str()) {
            Some("success") => Severity::Success,
            Some("error") => Severity::Error,
            Some("info") => Severity::Info,
            _ => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing or invalid severity"),
                );
            }
        };

        let text = match params.get("text").and_then(|v| v.as_str()) {
            Some(text) => text,
            None => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing text"),
                );
            }
        };

        let auto_dismiss_ms = params
            .get("auto_dismiss_ms")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_AUTO_DISMISS_MS);

        let id = self.notifier.notify(severity, text, auto_dismiss_ms);
        IpcMessage::response_ok(&msg.id, serde_json::json!({ "id": id }))
    }

    async fn handle_notifications_dismiss(&self, msg: &IpcMessage) -> IpcMessage {
        let id = match msg.params.as_ref().and_then(|p| p.get("id")).and_then(|v| v.as_str()) {
            Some(id) => id,
            None => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing id"),
                );
            }
        };

        self.notifier.dismiss(id);
        IpcMessage::response_ok(&msg.id, serde_json::json!({ "dismissed": id }))
    }

    async fn handle_viewport_configure(&self, msg: &IpcMessage) -> IpcMessage {
        let config: TrackerConfig = match &msg.params {
            Some(params) => match serde_json::from_value(params.clone()) {
                Ok(config) => config,
                Err(e) => {
                    return IpcMessage::response_err(
                        &msg.id,
                        IpcError::new(
                            error_codes::INVALID_PARAMS,
                            format!("Invalid tracker config: {}", e),
                        ),
                    );
                }
            },
            None => TrackerConfig::default(),
        };

        let mut tracker = self.tracker.write().await;
        *tracker = VisibilityTracker::new(config);
        IpcMessage::response_ok(&msg.id, serde_json::json!(tracker.config()))
    }

    async fn handle_viewport_register(&self, msg: &IpcMessage) -> IpcMessage {
        let params = match &msg.params {
            Some(p) => p,
            None => return missing_params(&msg.id),
        };

        let (id, element) = match (
            params.get("id").and_then(|v| v.as_str()),
            params.get("element").and_then(|v| v.as_str()),
        ) {
            (Some(id), Some(element)) => (id, element),
            _ => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing id or element"),
                );
            }
        };

        self.tracker.write().await.register_anchor(id, element);
        IpcMessage::response_ok(&msg.id, serde_json::json!({ "registered": id }))
    }

    async fn handle_viewport_unregister(&self, msg: &IpcMessage) -> IpcMessage {
        let id = match msg.params.as_ref().and_then(|p| p.get("id")).and_then(|v| v.as_str()) {
            Some(id) => id,
            None => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing id"),
                );
            }
        };

        self.tracker.write().await.unregister(id);
        IpcMessage::response_ok(&msg.id, serde_json::json!({ "unregistered": id }))
    }

    async fn handle_viewport_report(&self, msg: &IpcMessage) -> IpcMessage {
        let params = match &msg.params {
            Some(p) => p,
            None => return missing_params(&msg.id),
        };

        let (id, intersecting) = match (
            params.get("id").and_then(|v| v.as_str()),
            params.get("intersecting").and_then(|v| v.as_bool()),
        ) {
            (Some(id), Some(intersecting)) => (id, intersecting),
            _ => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing id or intersecting"),
                );
            }
        };

        let mut tracker = self.tracker.write().await;
        tracker.record_intersection(id, intersecting);
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({ "visible": tracker.is_visible(id) }),
        )
    }

    async fn handle_viewport_query(&self, msg: &IpcMessage) -> IpcMessage {
        let id = match msg.params.as_ref().and_then(|p| p.get("id")).and_then(|v| v.as_str()) {
            Some(id) => id,
            None => {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, "Missing id"),
                );
            }
        };

        let tracker = self.tracker.read().await;
        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({
                "visible": tracker.is_visible(id),
                "was_visible": tracker.was_visible(id),
            }),
        )
    }

    async fn handle_viewport_reset(&self, msg: &IpcMessage) -> IpcMessage {
        self.tracker.write().await.reset();
        IpcMessage::response_ok(&msg.id, serde_json::json!({ "reset": true }))
    }

    async fn handle_settings_get(&self, msg: &IpcMessage) -> IpcMessage {
        let submitter_name = match self.settings.submitter_name().await {
            Ok(name) => name,
            Err(e) => return storage_error_response(&msg.id, e),
        };
        let language = match self.settings.language().await {
            Ok(language) => language,
            Err(e) => return storage_error_response(&msg.id, e),
        };

        IpcMessage::response_ok(
            &msg.id,
            serde_json::json!({
                "submitter_name": submitter_name,
                "language": language,
            }),
        )
    }

    async fn handle_settings_set(&self, msg: &IpcMessage) -> IpcMessage {
        let params = match &msg.params {
            Some(p) => p,
            None => return missing_params(&msg.id),
        };

        if let Some(name) = params.get("submitter_name").and_then(|v| v.as_str()) {
            if let Err(e) = self.settings.set_submitter_name(name).await {
                return storage_error_response(&msg.id, e);
            }
        }

        if let Some(language) = params.get("language").and_then(|v| v.as_str()) {
            if let Err(e) = self.settings.set_language(language).await {
                return IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::INVALID_PARAMS, e.to_string()),
                );
            }
        }

        self.handle_settings_get(msg).await
    }

    /// Submitter name for an upload: the request's value wins and is
    /// persisted for next time; otherwise the saved name is used.
    async fn resolve_submitter_name(&self, params: &serde_json::Value) -> Option<String> {
        match params.get("submitter_name").and_then(|v| v.as_str()) {
            Some(name) if !name.trim().is_empty() => {
                if let Err(e) = self.settings.set_submitter_name(name).await {
                    warn!("Failed to persist submitter name: {}", e);
                }
                Some(name.to_string())
            }
            _ => self.settings.submitter_name().await.ok().flatten(),
        }
    }
}

fn missing_params(id: &str) -> IpcMessage {
    IpcMessage::response_err(id, IpcError::new(error_codes::INVALID_PARAMS, "Missing params"))
}

fn upload_error_response(id: &str, error: &UploadError) -> IpcMessage {
    let code = match error {
        UploadError::SessionBusy => error_codes::UPLOAD_IN_PROGRESS,
        UploadError::Network(_) => error_codes::NETWORK_ERROR,
        _ => error_codes::API_ERROR,
    };
    IpcMessage::response_err(id, IpcError::new(code, error.to_string()))
}

fn storage_error_response(id: &str, error: anyhow::Error) -> IpcMessage {
    IpcMessage::response_err(
        id,
        IpcError::new(error_codes::STORAGE_ERROR, error.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::models::MessageType;
    use std::io::Write;

    async fn test_handler(
        transport: Arc<MockTransport>,
    ) -> (tempfile::TempDir, MessageHandler, broadcast::Sender<IpcMessage>) {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(MediaHostClient::with_transport(
            HostConfig::default(),
            transport,
        ));
        let settings = SettingsStore::with_path(dir.path().join("settings.db"))
            .await
            .unwrap();
        let staging = StagingArea::with_preview_dir(dir.path().join("previews")).unwrap();
        let (events, _) = broadcast::channel(64);
        let (shutdown, _) = broadcast::channel(1);
        let handler = MessageHandler::assemble(client, settings, staging, events.clone(), shutdown);
        (dir, handler, events)
    }

    fn request(method: &str, params: serde_json::Value) -> IpcMessage {
        IpcMessage::request(method, Some(params))
    }

    #[tokio::test]
    async fn ping_answers_pong() {
        let (_dir, handler, _events) = test_handler(Arc::new(MockTransport::new())).await;
        let response = handler
            .handle_message(IpcMessage::request(methods::PING, None))
            .await;

        assert_eq!(response.message_type, MessageType::Response);
        assert!(response.error.is_none());
        assert_eq!(response.result.unwrap()["pong"], true);
    }

    #[tokio::test]
    async fn unknown_methods_are_rejected() {
        let (_dir, handler, _events) = test_handler(Arc::new(MockTransport::new())).await;
        let response = handler
            .handle_message(IpcMessage::request("gallery.explode", None))
            .await;

        assert_eq!(
            response.error.unwrap().code,
            error_codes::METHOD_NOT_FOUND
        );
    }

    #[tokio::test]
    async fn gallery_get_populates_on_first_use() {
        let transport = Arc::new(MockTransport::new());
        transport.set_listing(
            "image",
            Ok(r#"{"resources": [{"public_id": "wedding/img1"}]}"#.to_string()),
        );
        transport.set_listing("video", Ok(r#"{"resources": []}"#.to_string()));

        let (_dir, handler, _events) = test_handler(transport).await;
        let response = handler
            .handle_message(IpcMessage::request(methods::GALLERY_GET, None))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["total"], 1);
        assert_eq!(result["entries"][0]["id"], "wedding/img1");
    }

    #[tokio::test]
    async fn upload_round_trips_and_remembers_the_submitter() {
        let transport = Arc::new(MockTransport::new());
        transport.push_upload(Ok(r#"{
            "public_id": "wedding/new",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/wedding/new",
            "width": 800,
            "height": 600,
            "resource_type": "image"
        }"#
        .to_string()));

        let (dir, handler, _events) = test_handler(transport).await;
        let photo = dir.path().join("photo.jpg");
        std::fs::File::create(&photo)
            .unwrap()
            .write_all(b"pixels")
            .unwrap();

        let response = handler
            .handle_message(request(
                methods::MEDIA_UPLOAD,
                serde_json::json!({
                    "file_path": photo.display().to_string(),
                    "caption": "Hello",
                    "submitter_name": "Ana",
                }),
            ))
            .await;

        let entry = response.result.unwrap();
        assert_eq!(entry["caption"], "Hello");
        assert_eq!(entry["submitter_name"], "Ana");

        // The submitter name is persisted for the next session.
        let settings = handler
            .handle_message(IpcMessage::request(methods::SETTINGS_GET, None))
            .await;
        assert_eq!(settings.result.unwrap()["submitter_name"], "Ana");
    }

    #[tokio::test]
    async fn staged_batch_upload_clears_the_staging_area() {
        let transport = Arc::new(MockTransport::new());
        transport.push_upload(Ok(r#"{
            "public_id": "wedding/staged",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/wedding/staged",
            "width": 800,
            "height": 600
        }"#
        .to_string()));

        let (dir, handler, _events) = test_handler(transport).await;
        let photo = dir.path().join("staged.jpg");
        std::fs::File::create(&photo)
            .unwrap()
            .write_all(b"pixels")
            .unwrap();

        let staged = handler
            .handle_message(request(
                methods::MEDIA_STAGE,
                serde_json::json!({ "file_path": photo.display().to_string() }),
            ))
            .await;
        assert!(staged.error.is_none());

        let response = handler
            .handle_message(request(
                methods::MEDIA_UPLOAD_BATCH,
                serde_json::json!({ "staged": true }),
            ))
            .await;
        assert_eq!(response.result.unwrap()["total"], 1);

        let listing = handler
            .handle_message(IpcMessage::request(methods::MEDIA_STAGED, None))
            .await;
        assert_eq!(
            listing.result.unwrap()["files"].as_array().unwrap().len(),
            0
        );
    }

    #[tokio::test]
    async fn viewport_reports_round_trip() {
        let (_dir, handler, _events) = test_handler(Arc::new(MockTransport::new())).await;

        handler
            .handle_message(request(
                methods::VIEWPORT_CONFIGURE,
                serde_json::json!({ "keep_visible": false, "proximity_margin_px": 400 }),
            ))
            .await;
        handler
            .handle_message(request(
                methods::VIEWPORT_REGISTER,
                serde_json::json!({ "id": "media-1", "element": "card-1" }),
            ))
            .await;
        handler
            .handle_message(request(
                methods::VIEWPORT_REPORT,
                serde_json::json!({ "id": "media-1", "intersecting": true }),
            ))
            .await;

        let query = handler
            .handle_message(request(
                methods::VIEWPORT_QUERY,
                serde_json::json!({ "id": "media-1" }),
            ))
            .await;
        let result = query.result.unwrap();
        assert_eq!(result["visible"], true);
        assert_eq!(result["was_visible"], false);

        handler
            .handle_message(request(
                methods::VIEWPORT_REPORT,
                serde_json::json!({ "id": "media-1", "intersecting": false }),
            ))
            .await;

        let query = handler
            .handle_message(request(
                methods::VIEWPORT_QUERY,
                serde_json::json!({ "id": "media-1" }),
            ))
            .await;
        let result = query.result.unwrap();
        assert_eq!(result["visible"], false);
        assert_eq!(result["was_visible"], true);
    }

    #[tokio::test]
    async fn settings_set_validates_the_language() {
        let (_dir, handler, _events) = test_handler(Arc::new(MockTransport::new())).await;

        let response = handler
            .handle_message(request(
                methods::SETTINGS_SET,
                serde_json::json!({ "language": "ro" }),
            ))
            .await;
        assert_eq!(response.result.unwrap()["language"], "ro");

        let response = handler
            .handle_message(request(
                methods::SETTINGS_SET,
                serde_json::json!({ "language": "en" }),
            ))
            .await;
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }
}
