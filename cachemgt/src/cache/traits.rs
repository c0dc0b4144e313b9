// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Capability contract for registrable caches

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{CacheError, CacheLabel, TableRecordReference};

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a registered cache instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheId(u64);

impl CacheId {
    /// Allocate a process-unique cache id
    pub fn next() -> Self {
        CacheId(NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_u64(id: u64) -> Self {
        CacheId(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CacheId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cache_{}", self.0)
    }
}

/// A cache that can be registered with the coordinator
///
/// The coordinator only keeps a weak reference to registered caches, so
/// implementations must be owned elsewhere. Reset methods return how many
/// entries were invalidated; an `Err` (or a panic) is logged by the
/// coordinator and counted as zero.
pub trait CacheInterface: Send + Sync {
    fn cache_id(&self) -> CacheId;

    /// Labels this cache is filed under; must not be empty
    fn labels(&self) -> HashSet<CacheLabel>;

    /// Estimated number of cached entries
    fn size(&self) -> u64;

    /// Invalidate everything
    fn reset(&self) -> Result<u64, CacheError>;

    /// Invalidate entries tied to one record
    fn reset_for_record_id(&self, record: &TableRecordReference) -> Result<u64, CacheError>;
}
