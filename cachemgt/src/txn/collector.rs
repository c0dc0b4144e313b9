// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Invalidation requests collected until a transaction commits
//!
//! One collector exists per open transaction. Requests are stored
//! individually, so the same request scheduled several times before the
//! commit is flushed once, with the mode of the last call. On commit the
//! pending requests are swapped out under a single lock and resubmitted to the
//! coordinator as one multi-request per batch (local and broadcast).

use parking_lot::Mutex;
use std::collections::HashMap;

use super::TransactionId;
use crate::cache::{CacheInvalidateMultiRequest, CacheInvalidateRequest, ResetMode};
use crate::coordinator::CacheMgt;

/// Requests waiting for the commit
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingResets {
    requests: HashMap<CacheInvalidateRequest, ResetMode>,
    reset_all: Option<ResetMode>,
}

impl PendingResets {
    pub fn len(&self) -> usize {
        self.requests.len() + usize::from(self.reset_all.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.reset_all.is_none()
    }

    pub fn mode_of(&self, request: &CacheInvalidateRequest) -> Option<ResetMode> {
        self.requests.get(request).copied()
    }

    pub fn reset_all_mode(&self) -> Option<ResetMode> {
        self.reset_all
    }

    /// Split into the multi-request to reset locally and the one to broadcast
    pub fn into_batches(
        self,
    ) -> (
        Option<CacheInvalidateMultiRequest>,
        Option<CacheInvalidateMultiRequest>,
    ) {
        let mut local = Vec::new();
        let mut broadcast = Vec::new();
        for (request, mode) in self.requests {
            if mode.is_reset_local() {
                local.push(request.clone());
            }
            if mode.is_broadcast() {
                broadcast.push(request);
            }
        }

        let reset_all_local = self.reset_all.is_some_and(|mode| mode.is_reset_local());
        let reset_all_broadcast = self.reset_all.is_some_and(|mode| mode.is_broadcast());

        (
            batch(local, reset_all_local),
            batch(broadcast, reset_all_broadcast),
        )
    }
}

fn batch(
    requests: Vec<CacheInvalidateRequest>,
    reset_all: bool,
) -> Option<CacheInvalidateMultiRequest> {
    if reset_all {
        Some(CacheInvalidateMultiRequest::all())
    } else if requests.is_empty() {
        None
    } else {
        Some(CacheInvalidateMultiRequest::of(requests))
    }
}

/// Per-transaction collector of deferred invalidation requests
#[derive(Debug)]
pub struct TrxResetCollector {
    transaction_id: TransactionId,
    pending: Mutex<PendingResets>,
}

impl TrxResetCollector {
    pub fn new(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            pending: Mutex::new(PendingResets::default()),
        }
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// Enqueue every request of `request`; the last mode wins per request
    pub fn add_record(&self, request: &CacheInvalidateMultiRequest, mode: ResetMode) {
        {
            let mut pending = self.pending.lock();
            if request.is_reset_all() {
                pending.reset_all = Some(mode);
            } else {
                for single in request.requests() {
                    pending.requests.insert(single.clone(), mode);
                }
            }
        }

        log::debug!(
            "Scheduled cache invalidation on {} commit: {} ({})",
            self.transaction_id,
            request,
            mode
        );
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Snapshot of the pending requests
    pub fn pending(&self) -> PendingResets {
        self.pending.lock().clone()
    }

    /// Take all pending requests, leaving the collector empty
    pub fn drain(&self) -> PendingResets {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Flush pending requests through the coordinator; no-op when nothing is pending
    pub fn send_requests_and_clear(&self, cache_mgt: &CacheMgt) {
        let pending = self.drain();
        if pending.is_empty() {
            return;
        }

        log::debug!(
            "Flushing {} cache invalidation request(s) after {} commit",
            pending.len(),
            self.transaction_id
        );

        let (local, broadcast) = pending.into_batches();
        if let Some(local) = local {
            cache_mgt.reset(&local, ResetMode::Local);
        }
        if let Some(broadcast) = broadcast {
            cache_mgt.reset(&broadcast, ResetMode::JustBroadcast);
        }
    }
}
