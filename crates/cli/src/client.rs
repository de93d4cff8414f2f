// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot request/response client against the daemon's Unix socket.

use std::path::PathBuf;

use hive_daemon::lifecycle::{DaemonPaths, LifecycleError};
use hive_daemon::{read_response, write_request, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (try `hive daemon start`)")]
    NotRunning,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("{0}")]
    Daemon(String),
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Resolve the socket path. Does not touch the socket yet.
    pub fn connect() -> Result<Self, ClientError> {
        let paths = DaemonPaths::load()?;
        Ok(DaemonClient { socket_path: paths.socket_path })
    }

    /// Send one request and wait for its response. A `Response::Error`
    /// from the daemon becomes [`ClientError::Daemon`]; everything else
    /// (including conflict responses) passes through for the caller.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|_| ClientError::NotRunning)?;
        write_request(&mut stream, request).await?;
        match read_response(&mut stream).await? {
            Response::Error { message } => Err(ClientError::Daemon(message)),
            other => Ok(other),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: env!("CARGO_PKG_VERSION").to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }

    fn reject<T>(other: Response) -> Result<T, ClientError> {
        Err(ClientError::Daemon(format!("unexpected response: {:?}", other)))
    }
}
