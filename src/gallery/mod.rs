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

//! Gallery data store
//!
//! Holds the canonical list of media entries and derives the display order.
//! The store is the single writer: entries enter through a completed upload
//! or a bulk fetch and are immutable afterwards.

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::api::MediaHostClient;
use crate::models::{MediaEntry, Severity, DEFAULT_AUTO_DISMISS_MS};
use crate::notify::NotificationBroker;

/// Canonical list of gallery media
pub struct GalleryStore {
    entries: RwLock<Vec<MediaEntry>>,
    loaded: Mutex<bool>,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            loaded: Mutex::new(false),
        }
    }

    /// Prepend `entries`, most-recent-first, preserving their relative order.
    ///
    /// No de-duplication is performed; callers must not re-add an id.
    pub async fn add_entries(&self, entries: Vec<MediaEntry>) {
        if entries.is_empty() {
            return;
        }
        let mut guard = self.entries.write().await;
        let mut merged = entries;
        merged.append(&mut guard);
        *guard = merged;
    }

    /// Full set in insertion order
    pub async fn all(&self) -> Vec<MediaEntry> {
        self.entries.read().await.clone()
    }

    /// Full set ordered by descending creation time, stable for equal
    /// timestamps. Recomputed on every read; fine for the tens to low
    /// hundreds of entries a gallery holds.
    pub async fn sorted_by_recency(&self) -> Vec<MediaEntry> {
        let mut entries = self.entries.read().await.clone();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Populate the store from the media host on first use.
    ///
    /// A failed fetch is surfaced as an error notification and leaves the
    /// store empty; there is no automatic retry (an explicit
    /// [`GalleryStore::refresh`] is the reload path).
    pub async fn ensure_loaded(&self, client: &MediaHostClient, notifier: &NotificationBroker) {
        let mut loaded = self.loaded.lock().await;
        if *loaded {
            return;
        }
        *loaded = true;

        match client.fetch_all().await {
            Ok(entries) => {
                info!("Loaded {} media entries from host", entries.len());
                *self.entries.write().await = entries;
            }
            Err(e) => {
                warn!("Initial gallery fetch failed: {}", e);
                notifier.notify(Severity::Error, e.to_string(), DEFAULT_AUTO_DISMISS_MS);
            }
        }
    }

    /// Re-fetch from the host on explicit request, replacing the list on
    /// success. Returns whether the refresh succeeded.
    pub async fn refresh(&self, client: &MediaHostClient, notifier: &NotificationBroker) -> bool {
        let mut loaded = self.loaded.lock().await;
        *loaded = true;

        match client.fetch_all().await {
            Ok(entries) => {
                info!("Refreshed gallery with {} media entries", entries.len());
                *self.entries.write().await = entries;
                true
            }
            Err(e) => {
                warn!("Gallery refresh failed: {}", e);
                notifier.notify(Severity::Error, e.to_string(), DEFAULT_AUTO_DISMISS_MS);
                false
            }
        }
    }
}

impl Default for GalleryStore {
    fn default() -> Self {
        Self::new()
    }
}
