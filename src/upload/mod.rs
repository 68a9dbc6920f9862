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

//! Upload coordinator
//!
//! Owns the upload session state machine, sequences single- and multi-file
//! submissions through the media host client, aggregates per-file progress
//! into one overall percentage and publishes completed entries to the
//! gallery.

mod staging;

pub use staging::StagingArea;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::api::{MediaHostClient, ProgressObserver, UploadError};
use crate::gallery::GalleryStore;
use crate::models::{
    aggregate_progress, events as ipc_events, IpcMessage, MediaEntry, Severity, UploadSession,
    UploadState, DEFAULT_AUTO_DISMISS_MS,
};
use crate::notify::NotificationBroker;

/// Fallback notification text when a failure carries no message
const GENERIC_UPLOAD_ERROR: &str = "Failed to upload media";

/// Coordinates uploads between the staging area, the media host client and
/// the gallery store
pub struct UploadCoordinator {
    client: Arc<MediaHostClient>,
    gallery: Arc<GalleryStore>,
    notifier: Arc<NotificationBroker>,
    state: Mutex<UploadState>,
    progress: Arc<AtomicU8>,
    events: Option<broadcast::Sender<IpcMessage>>,
}

impl UploadCoordinator {
    pub fn new(
        client: Arc<MediaHostClient>,
        gallery: Arc<GalleryStore>,
        notifier: Arc<NotificationBroker>,
    ) -> Self {
        Self::build(client, gallery, notifier, None)
    }

    /// Create a coordinator that also pushes progress/state events to the UI
    pub fn with_events(
        client: Arc<MediaHostClient>,
        gallery: Arc<GalleryStore>,
        notifier: Arc<NotificationBroker>,
        events: broadcast::Sender<IpcMessage>,
    ) -> Self {
        Self::build(client, gallery, notifier, Some(events))
    }

    fn build(
        client: Arc<MediaHostClient>,
        gallery: Arc<GalleryStore>,
        notifier: Arc<NotificationBroker>,
        events: Option<broadcast::Sender<IpcMessage>>,
    ) -> Self {
        Self {
            client,
            gallery,
            notifier,
            state: Mutex::new(UploadState::Idle),
            progress: Arc::new(AtomicU8::new(0)),
            events,
        }
    }

    /// Current session snapshot
    pub async fn session(&self) -> UploadSession {
        UploadSession {
            state: *self.state.lock().await,
            progress: self.progress.load(Ordering::SeqCst),
        }
    }

    /// Upload a single file and publish it to the gallery.
    pub async fn submit_one(
        &self,
        file_path: &Path,
        caption: Option<String>,
        submitter_name: Option<String>,
    ) -> Result<MediaEntry, UploadError> {
        self.begin_session().await?;

        let observer = self.progress_observer(None);
        match self
            .client
            .upload(
                file_path,
                Some(observer),
                caption.as_deref(),
                submitter_name.as_deref(),
            )
            .await
        {
            Ok(result) => {
                let entry = MediaEntry::from_upload(result, caption, submitter_name);
                self.gallery.add_entries(vec![entry.clone()]).await;
                self.finish_session(1).await;
                Ok(entry)
            }
            Err(e) => {
                self.fail_session(&e).await;
                Err(e)
            }
        }
    }

    /// Upload `files` strictly in input order and publish the whole batch at
    /// once.
    ///
    /// Sequential processing bounds host load and keeps the aggregate
    /// percentage coherent: file `i` of `n` at per-file progress `p`
    /// contributes `round(((i + p/100) / n) * 100)`. A failure aborts the
    /// remaining files and publishes nothing; the gallery is only touched
    /// after every file has completed.
    pub async fn submit_many(
        &self,
        files: &[PathBuf],
        caption: Option<String>,
        submitter_name: Option<String>,
    ) -> Result<Vec<MediaEntry>, UploadError> {
        self.begin_session().await?;

        let total = files.len();
        let mut batch = Vec::with_capacity(total);

        for (index, file_path) in files.iter().enumerate() {
            let observer = self.progress_observer(Some((index, total)));
            match self
                .client
                .upload(
                    file_path,
                    Some(observer),
                    caption.as_deref(),
                    submitter_name.as_deref(),
                )
                .await
            {
                Ok(result) => {
                    batch.push(MediaEntry::from_upload(
                        result,
                        caption.clone(),
                        submitter_name.clone(),
                    ));
                }
                Err(e) => {
                    self.fail_session(&e).await;
                    return Err(e);
                }
            }
        }

        self.gallery.add_entries(batch.clone()).await;
        self.finish_session(batch.len()).await;
        Ok(batch)
    }

    /// Start a new session, rejecting overlap with an in-flight one.
    async fn begin_session(&self) -> Result<(), UploadError> {
        let mut state = self.state.lock().await;
        if *state == UploadState::Uploading {
            warn!("Rejecting submit: an upload session is already in flight");
            return Err(UploadError::SessionBusy);
        }
        *state = UploadState::Uploading;
        self.progress.store(0, Ordering::SeqCst);
        self.send_state_event(UploadState::Uploading);
        Ok(())
    }

    async fn finish_session(&self, count: usize) {
        *self.state.lock().await = UploadState::Completed;
        self.progress.store(100, Ordering::SeqCst);
        info!("Upload session completed with {} entries", count);

        self.notifier
            .notify(Severity::Success, "Upload completed", DEFAULT_AUTO_DISMISS_MS);
        self.send_state_event(UploadState::Completed);
        self.send_event(IpcMessage::event(
            ipc_events::UPLOAD_COMPLETED,
            serde_json::json!({ "count": count }),
        ));
        self.send_event(IpcMessage::event(
            ipc_events::GALLERY_UPDATED,
            serde_json::json!({ "total": self.gallery.len().await }),
        ));
    }

    async fn fail_session(&self, error: &UploadError) {
        *self.state.lock().await = UploadState::Error;
        self.progress.store(0, Ordering::SeqCst);

        let mut message = error.to_string();
        if message.is_empty() {
            message = GENERIC_UPLOAD_ERROR.to_string();
        }
        warn!("Upload session failed: {}", message);

        self.notifier
            .notify(Severity::Error, message.clone(), DEFAULT_AUTO_DISMISS_MS);
        self.send_state_event(UploadState::Error);
        self.send_event(IpcMessage::event(
            ipc_events::UPLOAD_FAILED,
            serde_json::json!({ "message": message }),
        ));
    }

    /// Observer forwarding per-file progress into the session aggregate.
    ///
    /// `batch_position` is `(index, total)` inside a batch; a lone upload
    /// maps file progress directly. The aggregate only moves forward: a
    /// stale lower report never rewinds it.
    fn progress_observer(&self, batch_position: Option<(usize, usize)>) -> ProgressObserver {
        let progress = self.progress.clone();
        let events = self.events.clone();
        Arc::new(move |file_percent: u8| {
            let overall = match batch_position {
                Some((index, total)) => aggregate_progress(index, total, file_percent),
                None => file_percent,
            };
            let previous = progress.fetch_max(overall, Ordering::SeqCst);
            if overall > previous {
                if let Some(tx) = &events {
                    let _ = tx.send(IpcMessage::event(
                        ipc_events::UPLOAD_PROGRESS,
                        serde_json::json!({ "percent": overall }),
                    ));
                }
            }
        })
    }

    fn send_state_event(&self, state: UploadState) {
        self.send_event(IpcMessage::event(
            ipc_events::UPLOAD_STATE,
            serde_json::json!({ "state": state }),
        ));
    }

    fn send_event(&self, message: IpcMessage) {
        if let Some(tx) = &self.events {
            let _ = tx.send(message);
        }
    }
}
