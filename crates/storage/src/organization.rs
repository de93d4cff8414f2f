// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The organization ledger: one mutable field with an adoption rule.
//!
//! First host to set the name wins. Adoption is monotonic — a set name is
//! never un-set by a later sync — and a different incoming name is a
//! conflict surfaced to the caller, never resolved here. The mesh has no
//! leader, so there is no tie-break.

use hive_core::OrganizationState;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::mesh::{StoreError, StoreInner};

/// Outcome of a successful adopt call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adoption {
    /// True when the local state was unset and took the incoming claim
    pub adopted: bool,
}

#[derive(Debug, Error)]
pub enum OrganizationError {
    #[error("organization mismatch: this host belongs to {current_name:?}, incoming claim is {incoming:?}")]
    Mismatch {
        current: OrganizationState,
        current_name: String,
        incoming: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Facade over the persisted organization claim.
#[derive(Clone)]
pub struct OrganizationLedger {
    inner: Arc<StoreInner>,
}

impl OrganizationLedger {
    pub(crate) fn new(inner: Arc<StoreInner>) -> Self {
        OrganizationLedger { inner }
    }

    pub fn get(&self) -> OrganizationState {
        self.inner.read(|state| state.organization.clone())
    }

    /// Apply an incoming organization claim.
    ///
    /// Unset local state adopts the claim (`adopted = true`). A matching
    /// name (case-sensitive) succeeds with `adopted = false`. A different
    /// name fails with [`OrganizationError::Mismatch`] carrying the
    /// current state; local state is left untouched.
    pub fn adopt(
        &self,
        name: &str,
        set_at_ms: u64,
        set_by: &str,
    ) -> Result<Adoption, OrganizationError> {
        let name = name.to_string();
        let set_by = set_by.to_string();
        self.inner.mutate(move |state| match state.organization.name.as_deref() {
            None => {
                info!(organization = %name, set_by = %set_by, "adopted organization");
                state.organization = OrganizationState::claimed(name, set_at_ms, set_by);
                Ok(Adoption { adopted: true })
            }
            Some(current) if current == name => Ok(Adoption { adopted: false }),
            Some(current) => Err(OrganizationError::Mismatch {
                current: state.organization.clone(),
                current_name: current.to_string(),
                incoming: name.clone(),
            }),
        })
    }
}

#[cfg(test)]
#[path = "organization_tests.rs"]
mod tests;
