// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and
//! handling them without blocking the sync loop. The Unix socket serves
//! the local CLI; the TCP listener serves peer hosts. Mutating CLI
//! operations are refused over TCP.

mod hosts;
mod query;
mod sync;

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Instant;

use hive_storage::AgentRegistry;
use hive_wire::{read_request, write_response, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::Notify;
use tracing::{debug, error, warn};

use crate::adapters::SessionAdapter;
use crate::directory::AgentDirectory;
use crate::sync::{PeerClient, SyncService};

/// Shared daemon context for all request handlers.
pub(crate) struct ListenCtx {
    pub sync: Arc<SyncService>,
    pub client: PeerClient,
    pub registry: Arc<AgentRegistry>,
    pub directory: Arc<AgentDirectory>,
    pub sessions: Arc<dyn SessionAdapter>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Listener task for accepting socket connections.
pub(crate) struct Listener {
    unix: UnixListener,
    tcp: Option<TcpListener>,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Where a connection came from; gates CLI-only operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionSource {
    Unix,
    Tcp,
}

impl Listener {
    /// Create a new listener with Unix socket only.
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, tcp: None, ctx }
    }

    /// Create a new listener with both Unix socket and TCP.
    pub fn with_tcp(unix: UnixListener, tcp: TcpListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, tcp: Some(tcp), ctx }
    }

    /// Run the listener loop until shutdown, spawning tasks for each connection.
    pub async fn run(mut self) {
        match self.tcp.take() {
            Some(tcp) => self.run_dual(tcp).await,
            None => self.run_unix_only().await,
        }
    }

    /// Listen on the Unix socket only (single-host mode).
    async fn run_unix_only(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) =
                            handle_connection(reader, writer, ConnectionSource::Unix, &ctx).await
                        {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!("Unix accept error: {}", e),
            }
        }
    }

    /// Listen on both the Unix socket and TCP.
    async fn run_dual(self, tcp: TcpListener) {
        loop {
            tokio::select! {
                result = self.unix.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            let ctx = Arc::clone(&self.ctx);
                            tokio::spawn(async move {
                                let (reader, writer) = stream.into_split();
                                if let Err(e) = handle_connection(reader, writer, ConnectionSource::Unix, &ctx).await {
                                    log_connection_error(e);
                                }
                            });
                        }
                        Err(e) => error!("Unix accept error: {}", e),
                    }
                }
                result = tcp.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!("TCP connection from {}", addr);
                            let ctx = Arc::clone(&self.ctx);
                            tokio::spawn(async move {
                                let (reader, writer) = stream.into_split();
                                if let Err(e) = handle_connection(reader, writer, ConnectionSource::Tcp, &ctx).await {
                                    log_connection_error(e);
                                }
                            });
                        }
                        Err(e) => error!("TCP accept error: {}", e),
                    }
                }
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::Io(io)) => {
            debug!("connection closed: {}", io);
        }
        other => warn!("connection error: {}", other),
    }
}

/// Serve one connection: a loop of framed request/response pairs until
/// the peer hangs up.
async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    source: ConnectionSource,
    ctx: &Arc<ListenCtx>,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let request = match read_request(&mut reader).await {
            Ok(request) => request,
            Err(ProtocolError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let is_shutdown = matches!(request, Request::Shutdown);
        let response = dispatch(request, source, ctx).await;
        write_response(&mut writer, &response).await?;

        if is_shutdown && matches!(response, Response::ShuttingDown) {
            ctx.shutdown.notify_one();
            return Ok(());
        }
    }
}

/// True for operations only the local CLI may perform.
fn is_local_only(request: &Request) -> bool {
    matches!(
        request,
        Request::HostAdd { .. }
            | Request::HostUpdate { .. }
            | Request::HostRemove { .. }
            | Request::HostSync { .. }
            | Request::OrgSet { .. }
            | Request::Shutdown
    )
}

async fn dispatch(request: Request, source: ConnectionSource, ctx: &Arc<ListenCtx>) -> Response {
    if source == ConnectionSource::Tcp && is_local_only(&request) {
        warn!(request = ?request, "refusing mutating CLI request over TCP");
        return Response::error("this operation is only available on the local socket");
    }

    match request {
        Request::Ping => Response::Pong,
        Request::Hello { version } => {
            debug!(client_version = %version, "hello");
            Response::Hello { version: crate::env::PROTOCOL_VERSION.to_string() }
        }

        Request::RegisterPeer {
            host,
            source,
            organization,
            organization_set_at_ms,
            organization_set_by,
        } => ctx.sync.handle_register(
            host,
            source,
            organization,
            organization_set_at_ms,
            organization_set_by,
        ),

        Request::ExchangePeers {
            from_host,
            known_hosts,
            propagation_id,
            organization,
            organization_set_at_ms,
            organization_set_by,
        } => {
            ctx.sync
                .handle_exchange(
                    from_host,
                    known_hosts,
                    propagation_id,
                    organization,
                    organization_set_at_ms,
                    organization_set_by,
                )
                .await
        }

        Request::PullDirectory => sync::handle_pull_directory(ctx).await,

        Request::Query { query } => query::handle_query(query, ctx).await,
        Request::Status => query::handle_status(ctx),

        Request::HostAdd { host } => hosts::handle_host_add(host, ctx).await,
        Request::HostUpdate { id, patch } => hosts::handle_host_update(id, patch, ctx),
        Request::HostRemove { id } => hosts::handle_host_remove(id, ctx),
        Request::HostSync { id } => hosts::handle_host_sync(id, ctx).await,
        Request::OrgSet { name } => hosts::handle_org_set(name, ctx),

        Request::Shutdown => Response::ShuttingDown,
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
