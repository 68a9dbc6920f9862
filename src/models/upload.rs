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

//! Upload session model

use serde::{Deserialize, Serialize};

/// State of an upload session
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Completed,
    Error,
}

/// Snapshot of the in-flight submit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    /// Overall session state
    pub state: UploadState,

    /// Aggregate progress percentage, 0-100; non-decreasing within a session
    pub progress: u8,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self {
            state: UploadState::Idle,
            progress: 0,
        }
    }
}

/// Aggregate percentage for file `index` of `total` at per-file progress
/// `file_percent`. Every file contributes equal weight regardless of size.
pub fn aggregate_progress(index: usize, total: usize, file_percent: u8) -> u8 {
    if total == 0 {
        return 100;
    }
    let fraction = (index as f64 + f64::from(file_percent) / 100.0) / total as f64;
    (fraction * 100.0).round() as u8
}
