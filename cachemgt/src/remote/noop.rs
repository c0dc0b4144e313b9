// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Gateway used when no transport is configured

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use super::RemoteInvalidationHandler;
use crate::cache::CacheInvalidateMultiRequest;

/// Remembers enabled tables and drops every event
#[derive(Debug, Default)]
pub struct NoopRemoteHandler {
    table_names: RwLock<HashSet<String>>,
    posted_events: AtomicU64,
}

impl NoopRemoteHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many events were posted (and dropped)
    pub fn posted_events(&self) -> u64 {
        self.posted_events.load(Ordering::Relaxed)
    }
}

impl RemoteInvalidationHandler for NoopRemoteHandler {
    fn post_event(&self, request: &CacheInvalidateMultiRequest) {
        self.posted_events.fetch_add(1, Ordering::Relaxed);
        log::debug!("No remote transport configured, dropping {}", request);
    }

    fn table_names_to_broadcast(&self) -> HashSet<String> {
        self.table_names.read().clone()
    }

    fn enable_for_table_name(&self, table_name: &str) {
        self.table_names.write().insert(table_name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_handler_tracks_tables_and_events() {
        let handler = NoopRemoteHandler::new();
        handler.enable_for_table_name("C_Period");
        handler.enable_for_table_name("C_Period");
        handler.post_event(&CacheInvalidateMultiRequest::all());

        assert_eq!(
            handler.table_names_to_broadcast(),
            HashSet::from(["C_Period".to_string()])
        );
        assert_eq!(handler.posted_events(), 1);
    }
}
