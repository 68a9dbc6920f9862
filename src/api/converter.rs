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

//! Converters from media host JSON to Confetti models

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{MediaEntry, MediaKind, UploadResult};

use super::client::DELIVERY_BASE;
use super::error::UploadError;

/// Width assumed when the host omits dimensions
const DEFAULT_WIDTH: u32 = 800;
/// Height assumed when the host omits dimensions
const DEFAULT_HEIGHT: u32 = 600;

/// Successful upload response payload
#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    resource_type: Option<String>,
}

/// One item of a tag listing
#[derive(Debug, Deserialize)]
struct ListingItem {
    public_id: String,
    created_at: Option<DateTime<Utc>>,
    width: Option<u32>,
    height: Option<u32>,
    context: Option<ListingContext>,
}

#[derive(Debug, Deserialize)]
struct ListingContext {
    custom: Option<CustomContext>,
}

#[derive(Debug, Default, Deserialize)]
struct CustomContext {
    caption: Option<String>,
    submitter_name: Option<String>,
}

/// Tag listing payload
#[derive(Debug, Deserialize)]
struct ListingResponse {
    resources: Vec<ListingItem>,
}

/// Parse an upload response body into an [`UploadResult`]
pub fn upload_result_from_json(
    body: &str,
    fallback_kind: MediaKind,
) -> Result<UploadResult, UploadError> {
    let response: UploadResponse =
        serde_json::from_str(body).map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

    Ok(UploadResult {
        host_id: response.public_id,
        url: response.secure_url,
        width: positive_or(response.width, DEFAULT_WIDTH),
        height: positive_or(response.height, DEFAULT_HEIGHT),
        kind: response
            .resource_type
            .as_deref()
            .map(MediaKind::from_host_str)
            .unwrap_or(fallback_kind),
    })
}

/// Parse a tag listing body into gallery entries.
///
/// Dimensions default to 800x600 and the creation time to the fetch time
/// when the host omits them; the display URL is derived from the public id.
pub fn entries_from_listing(
    body: &str,
    account: &str,
    kind: MediaKind,
) -> Result<Vec<MediaEntry>, serde_json::Error> {
    let response: ListingResponse = serde_json::from_str(body)?;
    let fetched_at = Utc::now();

    Ok(response
        .resources
        .into_iter()
        .map(|item| {
            let url = delivery_url(account, kind, &item.public_id);
            let custom = item.context.and_then(|c| c.custom).unwrap_or_default();
            MediaEntry {
                id: item.public_id,
                url,
                caption: custom.caption,
                submitter_name: custom.submitter_name,
                created_at: item.created_at.unwrap_or(fetched_at),
                width: item.width.map(|w| positive_or(w, DEFAULT_WIDTH)).unwrap_or(DEFAULT_WIDTH),
                height: item
                    .height
                    .map(|h| positive_or(h, DEFAULT_HEIGHT))
                    .unwrap_or(DEFAULT_HEIGHT),
                kind,
            }
        })
        .collect())
}

/// Display URL the host serves a public id under
fn delivery_url(account: &str, kind: MediaKind, public_id: &str) -> String {
    format!(
        "{}/{}/{}/upload/{}",
        DELIVERY_BASE,
        account,
        kind.as_str(),
        public_id
    )
}

fn positive_or(value: u32, fallback: u32) -> u32 {
    if value > 0 {
        value
    } else {
        fallback
    }
}
