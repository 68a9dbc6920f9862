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

//! IPC server implementation
//!
//! Line-delimited JSON over a Unix socket (named pipe on Windows). Requests
//! are answered in order per connection; events (upload progress, gallery
//! updates, notifications) are pushed to every connected client as they
//! happen.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::models::{error_codes, IpcError, IpcMessage};

use super::handler::MessageHandler;

/// Named pipe name for Windows
#[cfg(windows)]
const PIPE_NAME: &str = r"\\.\pipe\confetti_ipc";

/// Unix socket path
#[cfg(not(windows))]
const PIPE_NAME: &str = "/tmp/confetti_ipc.sock";

/// Capacity of the event fan-out channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Run the IPC server until a shutdown is requested
pub async fn run_server() -> Result<()> {
    info!("Starting IPC server on {}", PIPE_NAME);

    let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let handler = Arc::new(MessageHandler::new(event_tx.clone(), shutdown_tx).await?);

    #[cfg(windows)]
    {
        run_windows_pipe_server(handler, event_tx, shutdown_rx).await
    }

    #[cfg(not(windows))]
    {
        run_unix_socket_server(handler, event_tx, shutdown_rx).await
    }
}

#[cfg(windows)]
async fn run_windows_pipe_server(
    handler: Arc<MessageHandler>,
    event_tx: broadcast::Sender<IpcMessage>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    use tokio::net::windows::named_pipe::{PipeMode, ServerOptions};

    loop {
        // Create a new pipe instance for the next client
        let pipe = ServerOptions::new()
            .first_pipe_instance(false)
            .pipe_mode(PipeMode::Message)
            .create(PIPE_NAME)
            .context("Failed to create named pipe")?;

        info!("Waiting for client connection...");

        tokio::select! {
            result = pipe.connect() => {
                match result {
                    Ok(()) => {
                        info!("Client connected");
                        let handler = handler.clone();
                        let events = event_tx.subscribe();
                        tokio::spawn(async move {
                            let (reader, writer) = tokio::io::split(pipe);
                            if let Err(e) = handle_client(reader, writer, handler, events).await {
                                error!("Client handler error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = shutdown.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(not(windows))]
async fn run_unix_socket_server(
    handler: Arc<MessageHandler>,
    event_tx: broadcast::Sender<IpcMessage>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    use tokio::net::UnixListener;

    // Remove a stale socket file from a previous run
    let _ = std::fs::remove_file(PIPE_NAME);

    let listener = UnixListener::bind(PIPE_NAME).context("Failed to bind Unix socket")?;

    info!("Listening on {}", PIPE_NAME);

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        info!("Client connected");
                        let handler = handler.clone();
                        let events = event_tx.subscribe();
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            if let Err(e) = handle_client(reader, writer, handler, events).await {
                                error!("Client handler error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = shutdown.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    // Cleanup
    let _ = std::fs::remove_file(PIPE_NAME);

    Ok(())
}

/// Serve one client: answer its requests and push events as they happen
async fn handle_client<R, W>(
    reader: R,
    writer: W,
    handler: Arc<MessageHandler>,
    mut events: broadcast::Receiver<IpcMessage>,
) -> Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let writer = Arc::new(Mutex::new(writer));

    let mut line = String::new();

    loop {
        line.clear();
        tokio::select! {
            read = reader.read_line(&mut line) => {
                match read {
                    Ok(0) => {
                        info!("Client disconnected");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }

                        debug!("Received message: {}", trimmed);

                        let response = match serde_json::from_str::<IpcMessage>(trimmed) {
                            Ok(msg) => handler.handle_message(msg).await,
                            Err(e) => {
                                warn!("Failed to parse message: {}", e);
                                IpcMessage::response_err(
                                    "unknown",
                                    IpcError::new(
                                        error_codes::PARSE_ERROR,
                                        format!("Failed to parse message: {}", e),
                                    ),
                                )
                            }
                        };

                        write_message(&writer, &response).await?;
                    }
                    Err(e) => {
                        error!("Read error: {}", e);
                        break;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        crate::log_ipc!(event, event.method.as_deref().unwrap_or("unknown"));
                        write_message(&writer, &event).await?;
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Client lagged behind, {} events dropped", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}

async fn write_message<W>(writer: &Arc<Mutex<W>>, message: &IpcMessage) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(message)?;
    let mut w = writer.lock().await;
    w.write_all(json.as_bytes()).await?;
    w.write_all(b"\n").await?;
    w.flush().await?;
    Ok(())
}
