// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gossip propagation dedup.
//!
//! Every logical gossip event carries an opaque id chosen by the
//! originating host. The tracker remembers processed ids for a retention
//! window so an id arriving again — from any host, after any number of
//! hops — short-circuits before touching the host store. This is what
//! makes re-broadcast terminate.
//!
//! Constructed once per process and injected into the handlers; there is
//! no ambient global.

use hive_core::{Clock, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// TTL-bounded set of processed propagation ids.
pub struct PropagationTracker<C: Clock = SystemClock> {
    ttl_ms: u64,
    clock: C,
    /// id → epoch ms when first processed
    seen: Mutex<HashMap<String, u64>>,
}

impl PropagationTracker {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> PropagationTracker<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        PropagationTracker { ttl_ms: ttl.as_millis() as u64, clock, seen: Mutex::new(HashMap::new()) }
    }

    /// True if `id` was marked within the retention window.
    pub fn has_processed(&self, id: &str) -> bool {
        let now = self.clock.epoch_ms();
        self.seen
            .lock()
            .get(id)
            .is_some_and(|processed_at| now.saturating_sub(*processed_at) < self.ttl_ms)
    }

    /// Record `id` as processed and sweep expired entries.
    pub fn mark_processed(&self, id: &str) {
        let now = self.clock.epoch_ms();
        let mut seen = self.seen.lock();
        seen.retain(|_, processed_at| now.saturating_sub(*processed_at) < self.ttl_ms);
        seen.insert(id.to_string(), now);
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "propagation_tests.rs"]
mod tests;
