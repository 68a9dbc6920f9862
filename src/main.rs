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

//! Confetti Core - Rust backend for the wedding media-sharing gallery
//!
//! This binary runs as a background process and serves the gallery UI over
//! a JSON-based IPC protocol on a local socket: uploads to the cloud media
//! host, the gallery list, visibility tracking for lazy loading,
//! notifications, and persisted settings.

mod api;
mod cache;
mod gallery;
mod ipc;
mod logger;
mod models;
mod notify;
mod upload;
mod visibility;

use anyhow::Result;
use logger::Logger;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging system
    Logger::init()?;

    info!("Confetti Core starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Run the IPC server until a shutdown is requested
    match ipc::server::run_server().await {
        Ok(_) => {
            info!("Confetti Core shutting down gracefully");
        }
        Err(e) => {
            error!("Fatal error in IPC server: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
