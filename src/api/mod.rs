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

//! Media host client
//!
//! Talks to the cloud media host over its public REST endpoints: multipart
//! uploads authorized by an unauthenticated preset, and per-kind tag
//! listings.

mod client;
mod converter;
mod error;
mod transport;

pub use client::{HostConfig, MediaHostClient, ACCOUNT_ENV, MEDIA_TAG, UPLOAD_PRESET_ENV};
pub use error::{FetchError, TransportError, UploadError};
pub use transport::{HttpTransport, MediaTransport, ProgressObserver};

#[cfg(test)]
pub(crate) use transport::mock;
