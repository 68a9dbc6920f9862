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

//! IPC message models for communication between the core and the UI

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of IPC message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Request,
    Response,
    Event,
}

/// An IPC message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcMessage {
    /// Unique message ID (UUID)
    pub id: String,

    /// Message type
    #[serde(rename = "type")]
    pub message_type: MessageType,

    /// Method name for requests
    pub method: Option<String>,

    /// Parameters for requests
    pub params: Option<Value>,

    /// Result for responses
    pub result: Option<Value>,

    /// Error for failed responses
    pub error: Option<IpcError>,
}

impl IpcMessage {
    /// Create a new request message
    pub fn request(method: &str, params: Option<Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message_type: MessageType::Request,
            method: Some(method.to_string()),
            params,
            result: None,
            error: None,
        }
    }

    /// Create a success response
    pub fn response_ok(id: &str, result: Value) -> Self {
        Self {
            id: id.to_string(),
            message_type: MessageType::Response,
            method: None,
            params: None,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn response_err(id: &str, error: IpcError) -> Self {
        Self {
            id: id.to_string(),
            message_type: MessageType::Response,
            method: None,
            params: None,
            result: None,
            error: Some(error),
        }
    }

    /// Create an event message
    pub fn event(method: &str, params: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message_type: MessageType::Event,
            method: Some(method.to_string()),
            params: Some(params),
            result: None,
            error: None,
        }
    }
}

/// Error in an IPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    pub data: Option<Value>,
}

impl IpcError {
    /// Create a new error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Add data to the error
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Standard error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Application-specific errors
    pub const UPLOAD_IN_PROGRESS: i32 = -1001;
    pub const STORAGE_ERROR: i32 = -1002;
    pub const NETWORK_ERROR: i32 = -1003;
    pub const API_ERROR: i32 = -1004;
}

/// IPC method names
pub mod methods {
    // Gallery
    pub const GALLERY_GET: &str = "gallery.get";
    pub const GALLERY_GET_SORTED: &str = "gallery.get_sorted";
    pub const GALLERY_REFRESH: &str = "gallery.refresh";

    // Media staging and upload
    pub const MEDIA_STAGE: &str = "media.stage";
    pub const MEDIA_UNSTAGE: &str = "media.unstage";
    pub const MEDIA_STAGED: &str = "media.staged";
    pub const MEDIA_CLEAR_STAGED: &str = "media.clear_staged";
    pub const MEDIA_UPLOAD: &str = "media.upload";
    pub const MEDIA_UPLOAD_BATCH: &str = "media.upload_batch";
    pub const UPLOAD_STATE: &str = "upload.state";

    // Notifications
    pub const NOTIFICATIONS_LIST: &str = "notifications.list";
    pub const NOTIFICATIONS_SHOW: &str = "notifications.show";
    pub const NOTIFICATIONS_DISMISS: &str = "notifications.dismiss";

    // Viewport visibility
    pub const VIEWPORT_CONFIGURE: &str = "viewport.configure";
    pub const VIEWPORT_REGISTER: &str = "viewport.register";
    pub const VIEWPORT_UNREGISTER: &str = "viewport.unregister";
    pub const VIEWPORT_REPORT: &str = "viewport.report";
    pub const VIEWPORT_QUERY: &str = "viewport.query";
    pub const VIEWPORT_RESET: &str = "viewport.reset";

    // Settings
    pub const SETTINGS_GET: &str = "settings.get";
    pub const SETTINGS_SET: &str = "settings.set";

    // System
    pub const PING: &str = "ping";
    pub const SHUTDOWN: &str = "shutdown";
}

/// Event names pushed to the UI
pub mod events {
    pub const UPLOAD_PROGRESS: &str = "event.upload_progress";
    pub const UPLOAD_STATE: &str = "event.upload_state";
    pub const UPLOAD_COMPLETED: &str = "event.upload_completed";
    pub const UPLOAD_FAILED: &str = "event.upload_failed";
    pub const GALLERY_UPDATED: &str = "event.gallery_updated";
    pub const NOTIFICATION_SHOWN: &str = "event.notification_shown";
    pub const NOTIFICATION_DISMISSED: &str = "event.notification_dismissed";
    pub const ERROR: &str = "event.error";
}
