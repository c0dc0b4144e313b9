// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordinator statistics snapshot

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Point-in-time view of the coordinator, for inspection and monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheMgtStats {
    /// Number of labels with a caches group
    pub labels: usize,
    /// Live cache registrations, counted once per label
    pub cache_instances: usize,
    /// Entries held by all live caches
    pub total_size: u64,
    /// Completed full resets
    pub reset_generation: u64,
    pub last_reset_at: Option<DateTime<Utc>>,
    /// Transactions with a deferred-invalidation collector
    pub pending_transactions: usize,
}

impl fmt::Display for CacheMgtStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheMgt[Instances={}, Elements={}]",
            self.labels, self.total_size
        )
    }
}
