// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability probes.
//!
//! A probe is a lightweight liveness check against a candidate's
//! advertised url: connect, send a ping frame, expect a pong. A timeout
//! or any protocol hiccup means unreachable — unreachable candidates are
//! reported, never stored and never retried within the same call.

use async_trait::async_trait;
use std::time::Duration;

use hive_core::probe_addr;
use hive_wire::{read_response, write_request, Request, Response};
use tokio::net::TcpStream;
use tracing::debug;

/// Liveness check seam, so protocol tests run without sockets.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> bool;
}

/// Real probe: TCP connect plus a ping/pong round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        TcpProber
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, url: &str, timeout: Duration) -> bool {
        let Ok(addr) = probe_addr(url) else {
            return false;
        };
        let attempt = async {
            let mut stream = TcpStream::connect(&addr).await?;
            write_request(&mut stream, &Request::Ping).await?;
            let response = read_response(&mut stream).await?;
            Ok::<bool, hive_wire::ProtocolError>(matches!(response, Response::Pong))
        };
        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(alive)) => alive,
            Ok(Err(e)) => {
                debug!(url, error = %e, "probe failed");
                false
            }
            Err(_) => {
                debug!(url, "probe timed out");
                false
            }
        }
    }
}

/// Scripted prober for tests: a url is reachable iff it was marked so.
/// Records every probed url for assertions.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeProber {
    reachable: parking_lot::Mutex<std::collections::HashSet<String>>,
    probed: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeProber {
    pub fn new() -> Self {
        FakeProber {
            reachable: parking_lot::Mutex::new(std::collections::HashSet::new()),
            probed: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn mark_reachable(&self, url: &str) {
        self.reachable.lock().insert(url.to_string());
    }

    pub fn mark_unreachable(&self, url: &str) {
        self.reachable.lock().remove(url);
    }

    /// Urls probed so far, in call order.
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeProber {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, url: &str, _timeout: Duration) -> bool {
        self.probed.lock().push(url.to_string());
        self.reachable.lock().contains(url)
    }
}
