// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted mesh state and its atomic save path.
//!
//! The state file is small (a peer table plus one organization claim), so
//! every mutation rewrites it whole: serialize, write to a temp file,
//! rotate the previous copy to `.bak`, rename into place.

use chrono::{DateTime, Utc};
use hive_core::{Host, HostError, OrganizationState};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::{HostStore, OrganizationLedger};

/// Current state-file schema version
pub const CURRENT_STATE_VERSION: u32 = 1;

const MAX_BAK_FILES: u32 = 3;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("duplicate host id {0:?}")]
    DuplicateId(String),

    #[error("url {url:?} is already stored for host {existing_id:?}")]
    DuplicateUrl { url: String, existing_id: String },

    #[error("unknown host {0:?}")]
    NotFound(String),

    #[error("{0:?} is the local host; the self record is config, not state")]
    SelfHost(String),
}

/// The on-disk shape: remote peers plus the organization claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshState {
    /// Schema version for migrations
    #[serde(rename = "v")]
    pub version: u32,
    /// Remote peers only; the self host is synthesized from config
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub organization: OrganizationState,
    pub saved_at: DateTime<Utc>,
}

impl Default for MeshState {
    fn default() -> Self {
        MeshState {
            version: CURRENT_STATE_VERSION,
            hosts: Vec::new(),
            organization: OrganizationState::default(),
            saved_at: Utc::now(),
        }
    }
}

/// Shared interior for the facades. One lock covers both the in-memory
/// state and the file write, so check-then-insert sequences are atomic
/// against concurrent gossip fan-in.
pub(crate) struct StoreInner {
    path: PathBuf,
    state: Mutex<MeshState>,
}

impl StoreInner {
    /// Run a mutation under the store lock and persist the result.
    ///
    /// The previous state is restored if either the mutation or the save
    /// fails, so a failed operation leaves no partial effects.
    pub(crate) fn mutate<T, E: From<StoreError>>(
        &self,
        f: impl FnOnce(&mut MeshState) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut state = self.state.lock();
        let before = state.clone();
        match f(&mut state) {
            Ok(value) => {
                state.saved_at = Utc::now();
                if let Err(e) = save(&self.path, &state) {
                    *state = before;
                    return Err(E::from(e));
                }
                Ok(value)
            }
            Err(e) => {
                *state = before;
                Err(e)
            }
        }
    }

    /// Run a read-only closure under the store lock.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&MeshState) -> T) -> T {
        f(&self.state.lock())
    }
}

/// Handle to the persisted mesh state. Cheap to clone; all clones share
/// one lock and one file.
#[derive(Clone)]
pub struct MeshStore {
    inner: Arc<StoreInner>,
}

impl MeshStore {
    /// Open (or initialize) the state file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MeshState::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(MeshStore { inner: Arc::new(StoreInner { path, state: Mutex::new(state) }) })
    }

    /// The host-table facade. `self_host` is the synthesized local record.
    pub fn host_store(&self, self_host: Host) -> HostStore {
        HostStore::new(Arc::clone(&self.inner), self_host)
    }

    /// The organization-claim facade.
    pub fn organization(&self) -> OrganizationLedger {
        OrganizationLedger::new(Arc::clone(&self.inner))
    }
}

fn save(path: &Path, state: &MeshState) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes)?;
    if path.exists() {
        let bak = rotate_bak_path(path);
        if let Err(e) = fs::rename(path, &bak) {
            warn!(path = %path.display(), error = %e, "could not rotate state backup");
        }
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
/// The oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    // Remove the oldest if at capacity
    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    // Shift existing backups up by one
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
