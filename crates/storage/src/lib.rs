// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage layer for Hive: the durable local mesh state.
//!
//! One JSON state file holds the peer table and the organization claim;
//! `HostStore` and `OrganizationLedger` are facades over it. The agent
//! registry persists separately — it churns on every reconciliation pass
//! while the mesh state only changes on membership events.

mod agents;
mod hosts;
mod mesh;
mod organization;

pub use agents::AgentRegistry;
pub use hosts::{AddOutcome, HostStore, HostUpdate};
pub use mesh::{MeshState, MeshStore, StoreError, CURRENT_STATE_VERSION};
pub use organization::{Adoption, OrganizationError, OrganizationLedger};
