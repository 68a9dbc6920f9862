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

//! Error types for the media host client

use thiserror::Error;

/// Failure at the HTTP transport layer
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("media host returned status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// An upload was rejected or could not complete
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("upload failed: media host returned status {0}")]
    Rejected(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected response from media host: {0}")]
    InvalidResponse(String),

    #[error("another upload is already in progress")]
    SessionBusy,
}

impl From<TransportError> for UploadError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status(code) => UploadError::Rejected(code),
            TransportError::Network(reason) => UploadError::Network(reason),
            TransportError::Io(e) => UploadError::Io(e),
        }
    }
}

/// The gallery listing could not be fetched at all
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch media: {0}")]
    Unavailable(String),
}
