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

//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Auto-dismiss delay applied when callers do not specify one
pub const DEFAULT_AUTO_DISMISS_MS: u64 = 3000;

/// Severity of a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// An ephemeral user-facing message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: String,

    /// Severity shown to the user
    pub severity: Severity,

    /// Message text
    pub text: String,

    /// Delay before auto-dismissal, in milliseconds; 0 keeps it until
    /// explicitly dismissed
    pub auto_dismiss_ms: u64,

    /// When this notification was raised
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a notification with a fresh id
    pub fn new(severity: Severity, text: String, auto_dismiss_ms: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            severity,
            text,
            auto_dismiss_ms,
            created_at: Utc::now(),
        }
    }
}
