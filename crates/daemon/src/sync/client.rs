// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound peer calls.
//!
//! One request, one response, one timeout. A timed-out or failed call is
//! `Unreachable`; retry is the sync loop's business, never this client's.

use std::time::Duration;

use hive_core::{probe_addr, DirectoryEntry, OrganizationState};
use hive_wire::{read_response, write_request, HostIdentity, PropagationMeta, Request, Response};
use tokio::net::TcpStream;

use super::SyncError;

/// TCP client for the peer protocol.
#[derive(Debug, Clone)]
pub struct PeerClient {
    timeout: Duration,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Self {
        PeerClient { timeout }
    }

    /// Send one request and read one response, bounded by the timeout.
    pub async fn call(&self, url: &str, request: &Request) -> Result<Response, SyncError> {
        let addr = probe_addr(url)?;
        let attempt = async {
            let mut stream = TcpStream::connect(&addr).await.map_err(|e| e.to_string())?;
            write_request(&mut stream, request).await.map_err(|e| e.to_string())?;
            read_response(&mut stream).await.map_err(|e| e.to_string())
        };
        let response = match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(response)) => response,
            Ok(Err(reason)) => {
                return Err(SyncError::Unreachable { url: url.to_string(), reason })
            }
            Err(_) => {
                return Err(SyncError::Unreachable {
                    url: url.to_string(),
                    reason: "timed out".to_string(),
                })
            }
        };
        match response {
            Response::Error { message } => Err(SyncError::Peer(message)),
            other => Ok(other),
        }
    }

    /// register-peer against `url`.
    pub async fn register(
        &self,
        url: &str,
        host: HostIdentity,
        source: PropagationMeta,
        organization: &OrganizationState,
    ) -> Result<Response, SyncError> {
        let request = Request::RegisterPeer {
            host,
            source,
            organization: organization.name.clone(),
            organization_set_at_ms: organization.set_at_ms,
            organization_set_by: organization.set_by.clone(),
        };
        self.call(url, &request).await
    }

    /// exchange-peers against `url`.
    pub async fn exchange(
        &self,
        url: &str,
        from_host: HostIdentity,
        known_hosts: Vec<HostIdentity>,
        propagation_id: Option<String>,
        organization: &OrganizationState,
    ) -> Result<Response, SyncError> {
        let request = Request::ExchangePeers {
            from_host,
            known_hosts,
            propagation_id,
            organization: organization.name.clone(),
            organization_set_at_ms: organization.set_at_ms,
            organization_set_by: organization.set_by.clone(),
        };
        self.call(url, &request).await
    }

    /// Fetch a peer's local directory entries.
    pub async fn pull_directory(&self, url: &str) -> Result<Vec<DirectoryEntry>, SyncError> {
        match self.call(url, &Request::PullDirectory).await? {
            Response::Directory { entries, .. } => Ok(entries),
            other => Err(SyncError::UnexpectedResponse(format!("{:?}", other))),
        }
    }
}
