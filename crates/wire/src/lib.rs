// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for hive daemon communication.
//!
//! Serves two transports with one message set: the Unix socket (CLI to
//! local daemon) and TCP (host-to-host peer sync).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod query;
mod request;
mod response;
mod types;
mod wire;

pub use query::Query;
pub use request::Request;
pub use response::Response;
pub use types::{
    AgentSummary, DirectoryCounts, HostIdentity, HostPatch, LookupResult, PropagationMeta,
};
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
pub use wire::{read_request, read_response, write_request, write_response};
