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

//! Media models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of media resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Path segment the media host uses for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Infer the kind from a MIME type (`video/*` is video, everything else image)
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    /// Infer the kind from a file path via its extension
    pub fn from_path(path: &Path) -> Self {
        match mime_guess::from_path(path).first_raw() {
            Some(mime) => Self::from_mime(mime),
            None => MediaKind::Image,
        }
    }

    /// Parse the resource kind string the host reports, treating anything
    /// that is not a video as an image
    pub fn from_host_str(kind: &str) -> Self {
        if kind == "video" {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

/// One uploaded item in the gallery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEntry {
    /// Host-assigned identifier, unique within the gallery
    pub id: String,

    /// Display/playback URL
    pub url: String,

    /// Caption supplied at upload time
    pub caption: Option<String>,

    /// Display name of the guest who submitted it
    pub submitter_name: Option<String>,

    /// When this entry was created
    pub created_at: DateTime<Utc>,

    /// Pixel width (defaulted when the host does not report one)
    pub width: u32,

    /// Pixel height (defaulted when the host does not report one)
    pub height: u32,

    /// Kind of media
    pub kind: MediaKind,
}

impl MediaEntry {
    /// Build an entry from a completed upload, stamping the creation time
    pub fn from_upload(
        result: UploadResult,
        caption: Option<String>,
        submitter_name: Option<String>,
    ) -> Self {
        Self {
            id: result.host_id,
            url: result.url,
            caption,
            submitter_name,
            created_at: Utc::now(),
            width: result.width,
            height: result.height,
            kind: result.kind,
        }
    }
}

/// Result of a completed host upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    /// Host-assigned identifier
    pub host_id: String,
    /// Retrievable URL
    pub url: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Kind the host stored the resource as
    pub kind: MediaKind,
}

/// A locally staged file awaiting upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingFile {
    /// Local identifier for the staged file
    pub id: String,

    /// Path to the source file
    pub path: PathBuf,

    /// Preview reference; released when the file leaves the staging area
    pub preview: PathBuf,

    /// Kind inferred from the file's MIME type
    pub kind: MediaKind,
}
