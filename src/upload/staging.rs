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

//! Staging area for files awaiting upload
//!
//! Staged files carry a preview reference the UI can render before the
//! upload happens. Previews are owned exclusively by the staging area and
//! explicitly released on submit, removal, or cancellation.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::UploadError;
use crate::models::{MediaKind, PendingFile};

/// Locally staged, not-yet-uploaded files
pub struct StagingArea {
    files: Vec<PendingFile>,
    preview_dir: PathBuf,
}

impl StagingArea {
    /// Create a staging area with previews under the app data dir
    pub fn new() -> anyhow::Result<Self> {
        let preview_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Confetti")
            .join("previews");
        Self::with_preview_dir(preview_dir)
    }

    /// Create a staging area with previews under `preview_dir`
    pub fn with_preview_dir(preview_dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&preview_dir)?;
        Ok(Self {
            files: Vec::new(),
            preview_dir,
        })
    }

    /// Stage a local file: infer its kind and create the preview reference.
    pub fn stage(&mut self, path: &Path) -> Result<PendingFile, UploadError> {
        if !path.exists() {
            return Err(UploadError::FileNotFound(path.display().to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let preview = self.preview_path(&id, path);
        // Hard links make cheap previews of large videos; fall back to a
        // copy on filesystems that refuse them.
        if fs::hard_link(path, &preview).is_err() {
            fs::copy(path, &preview)?;
        }

        let file = PendingFile {
            id,
            path: path.to_path_buf(),
            preview,
            kind: MediaKind::from_path(path),
        };
        debug!("Staged {} as {}", path.display(), file.id);
        self.files.push(file.clone());
        Ok(file)
    }

    /// Remove a staged file and release its preview; unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) {
        if let Some(index) = self.files.iter().position(|f| f.id == id) {
            let file = self.files.remove(index);
            release_preview(&file);
        }
    }

    /// Release every staged file (submit completion or form cancellation).
    pub fn clear(&mut self) {
        for file in self.files.drain(..) {
            release_preview(&file);
        }
    }

    /// Currently staged files
    pub fn files(&self) -> &[PendingFile] {
        &self.files
    }

    /// Source paths of the staged files, in staging order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    fn preview_path(&self, id: &str, source: &Path) -> PathBuf {
        match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.preview_dir.join(format!("{}.{}", id, ext)),
            None => self.preview_dir.join(id),
        }
    }
}

fn release_preview(file: &PendingFile) {
    if let Err(e) = fs::remove_file(&file.preview) {
        warn!(
            "Failed to release preview {}: {}",
            file.preview.display(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn staging_with_source(names: &[&str]) -> (tempfile::TempDir, StagingArea, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::with_preview_dir(dir.path().join("previews")).unwrap();
        let paths = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                let mut file = fs::File::create(&path).unwrap();
                file.write_all(b"media bytes").unwrap();
                path
            })
            .collect();
        (dir, staging, paths)
    }

    #[test]
    fn staging_creates_a_preview_and_infers_the_kind() {
        let (_dir, mut staging, paths) = staging_with_source(&["clip.mp4", "photo.jpg"]);

        let clip = staging.stage(&paths[0]).unwrap();
        let photo = staging.stage(&paths[1]).unwrap();

        assert_eq!(clip.kind, MediaKind::Video);
        assert_eq!(photo.kind, MediaKind::Image);
        assert!(clip.preview.exists());
        assert!(photo.preview.exists());
        assert_eq!(staging.len(), 2);
    }

    #[test]
    fn staging_a_missing_file_fails() {
        let (_dir, mut staging, _paths) = staging_with_source(&[]);
        let err = staging.stage(Path::new("/nonexistent.jpg")).unwrap_err();
        assert!(matches!(err, UploadError::FileNotFound(_)));
        assert!(staging.is_empty());
    }

    #[test]
    fn removal_releases_the_preview() {
        let (_dir, mut staging, paths) = staging_with_source(&["photo.jpg"]);
        let staged = staging.stage(&paths[0]).unwrap();
        let preview = staged.preview.clone();

        staging.remove(&staged.id);
        assert!(staging.is_empty());
        assert!(!preview.exists());

        // Unknown ids are a no-op.
        staging.remove("gone");
    }

    #[test]
    fn clear_releases_every_preview() {
        let (_dir, mut staging, paths) = staging_with_source(&["a.jpg", "b.mp4"]);
        let previews: Vec<PathBuf> = paths
            .iter()
            .map(|p| staging.stage(p).unwrap().preview)
            .collect();

        staging.clear();
        assert!(staging.is_empty());
        for preview in previews {
            assert!(!preview.exists());
        }
    }
}
