//! Test utilities for CacheMgt integration tests
//!
//! - TestCache: counting cache registered under table labels
//! - RecordingRemoteHandler: remote gateway that keeps every posted event
//! - init_logging: env_logger wired to the test harness output

#![allow(dead_code)]

use cachemgt::{
    CacheError, CacheId, CacheInterface, CacheInvalidateMultiRequest, CacheLabel,
    RemoteInvalidationHandler, TableRecordReference,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Cache holding `entries` elements; a reset empties it and returns the count
pub struct TestCache {
    id: CacheId,
    labels: HashSet<CacheLabel>,
    entries: AtomicU64,
    failing: bool,
    keeps_entries: bool,
    resets: AtomicUsize,
    record_resets: Mutex<Vec<TableRecordReference>>,
}

impl TestCache {
    pub fn new(labels: &[&str], entries: u64) -> Self {
        Self {
            id: CacheId::next(),
            labels: labels.iter().map(|l| CacheLabel::of_table_name(l)).collect(),
            entries: AtomicU64::new(entries),
            failing: false,
            keeps_entries: false,
            resets: AtomicUsize::new(0),
            record_resets: Mutex::new(Vec::new()),
        }
    }

    /// A cache whose every reset fails
    pub fn failing(labels: &[&str], entries: u64) -> Self {
        Self {
            failing: true,
            ..Self::new(labels, entries)
        }
    }

    /// A cache reporting the same count on every reset; entries are never dropped
    pub fn keeping(labels: &[&str], entries: u64) -> Self {
        Self {
            keeps_entries: true,
            ..Self::new(labels, entries)
        }
    }

    pub fn fill(&self, entries: u64) {
        self.entries.store(entries, Ordering::SeqCst);
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn record_resets(&self) -> Vec<TableRecordReference> {
        self.record_resets.lock().clone()
    }
}

impl CacheInterface for TestCache {
    fn cache_id(&self) -> CacheId {
        self.id
    }

    fn labels(&self) -> HashSet<CacheLabel> {
        self.labels.clone()
    }

    fn size(&self) -> u64 {
        self.entries.load(Ordering::SeqCst)
    }

    fn reset(&self) -> Result<u64, CacheError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(CacheError::ResetFailed(format!("{} refused", self.id)));
        }
        if self.keeps_entries {
            return Ok(self.entries.load(Ordering::SeqCst));
        }
        Ok(self.entries.swap(0, Ordering::SeqCst))
    }

    fn reset_for_record_id(&self, record: &TableRecordReference) -> Result<u64, CacheError> {
        self.record_resets.lock().push(record.clone());
        if self.failing {
            panic!("{} cannot reset {}", self.id, record);
        }
        let entries = self.entries.load(Ordering::SeqCst);
        if entries == 0 {
            return Ok(0);
        }
        self.entries.fetch_sub(1, Ordering::SeqCst);
        Ok(1)
    }
}

/// Remote gateway recording every posted event
#[derive(Default)]
pub struct RecordingRemoteHandler {
    events: Mutex<Vec<CacheInvalidateMultiRequest>>,
    table_names: Mutex<HashSet<String>>,
}

impl RecordingRemoteHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CacheInvalidateMultiRequest> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl RemoteInvalidationHandler for RecordingRemoteHandler {
    fn post_event(&self, request: &CacheInvalidateMultiRequest) {
        self.events.lock().push(request.clone());
    }

    fn table_names_to_broadcast(&self) -> HashSet<String> {
        self.table_names.lock().clone()
    }

    fn enable_for_table_name(&self, table_name: &str) {
        self.table_names.lock().insert(table_name.to_string());
    }
}
