// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-label group of registered caches
//!
//! A group holds weak references only. Fan-out operations take a snapshot of
//! the caches that are still alive and call them without holding the group
//! lock, so caches may register or unregister while a reset is running. A
//! failing cache is logged and counted as zero; it never aborts the others.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use super::no_fail::call_no_fail;
use super::{CacheId, CacheInterface, CacheLabel, TableRecordReference};

pub struct CachesGroup {
    label: CacheLabel,
    caches: RwLock<HashMap<CacheId, Weak<dyn CacheInterface>>>,
}

impl CachesGroup {
    pub fn new(label: CacheLabel) -> Self {
        Self {
            label,
            caches: RwLock::new(HashMap::new()),
        }
    }

    pub fn label(&self) -> &CacheLabel {
        &self.label
    }

    /// Add or replace the entry for `cache_id`
    pub fn add_cache(&self, cache_id: CacheId, cache: Weak<dyn CacheInterface>) {
        let mut caches = self.caches.write();
        caches.retain(|_, cache| cache.strong_count() > 0);
        caches.insert(cache_id, cache);
    }

    pub fn remove_cache(&self, cache_id: CacheId) -> bool {
        self.caches.write().remove(&cache_id).is_some()
    }

    /// Caches that are still alive
    pub fn live_caches(&self) -> Vec<Arc<dyn CacheInterface>> {
        self.caches
            .read()
            .values()
            .filter_map(Weak::upgrade)
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.caches
            .read()
            .values()
            .filter(|cache| cache.strong_count() > 0)
            .count()
    }

    pub fn compute_total_size(&self) -> u64 {
        self.live_caches()
            .iter()
            .map(|cache| cache.size())
            .fold(0, u64::saturating_add)
    }

    pub fn invalidate_all_no_fail(&self) -> u64 {
        self.live_caches()
            .iter()
            .map(|cache| match call_no_fail(|| cache.reset()) {
                Ok(count) => count,
                Err(e) => {
                    log::warn!(
                        "Error while resetting {} in group {}: {}. Ignored.",
                        cache.cache_id(),
                        self.label,
                        e
                    );
                    0
                }
            })
            .fold(0, u64::saturating_add)
    }

    pub fn invalidate_for_record_no_fail(&self, record: &TableRecordReference) -> u64 {
        self.live_caches()
            .iter()
            .map(|cache| match call_no_fail(|| cache.reset_for_record_id(record)) {
                Ok(count) => count,
                Err(e) => {
                    log::warn!(
                        "Error while resetting {} for {}: {}. Ignored.",
                        cache.cache_id(),
                        record,
                        e
                    );
                    0
                }
            })
            .fold(0, u64::saturating_add)
    }
}

impl fmt::Display for CachesGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CachesGroup[label={}, size={}]",
            self.label,
            self.caches.read().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;
    use std::collections::HashSet;

    struct FixedCache {
        id: CacheId,
        entries: u64,
        fail: bool,
    }

    impl FixedCache {
        fn new(entries: u64) -> Arc<Self> {
            Arc::new(Self {
                id: CacheId::next(),
                entries,
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                id: CacheId::next(),
                entries: 100,
                fail: true,
            })
        }
    }

    impl CacheInterface for FixedCache {
        fn cache_id(&self) -> CacheId {
            self.id
        }

        fn labels(&self) -> HashSet<CacheLabel> {
            HashSet::from([CacheLabel::of_table_name("T")])
        }

        fn size(&self) -> u64 {
            self.entries
        }

        fn reset(&self) -> Result<u64, CacheError> {
            if self.fail {
                return Err(CacheError::ResetFailed("broken cache".to_string()));
            }
            Ok(self.entries)
        }

        fn reset_for_record_id(&self, _record: &TableRecordReference) -> Result<u64, CacheError> {
            if self.fail {
                panic!("broken cache");
            }
            Ok(1)
        }
    }

    fn add(group: &CachesGroup, cache: &Arc<FixedCache>) {
        let weak = Arc::downgrade(cache) as Weak<dyn CacheInterface>;
        group.add_cache(cache.id, weak);
    }

    #[test]
    fn test_failing_cache_does_not_abort_fan_out() {
        let group = CachesGroup::new(CacheLabel::of_table_name("T"));
        let healthy = FixedCache::new(3);
        let broken = FixedCache::failing();
        add(&group, &healthy);
        add(&group, &broken);

        assert_eq!(group.invalidate_all_no_fail(), 3);
        assert_eq!(
            group.invalidate_for_record_no_fail(&TableRecordReference::new("T", 1)),
            1
        );
    }

    #[test]
    fn test_counts_saturate() {
        let group = CachesGroup::new(CacheLabel::of_table_name("T"));
        let huge = FixedCache::new(u64::MAX);
        let one = FixedCache::new(1);
        add(&group, &huge);
        add(&group, &one);

        assert_eq!(group.invalidate_all_no_fail(), u64::MAX);
        assert_eq!(group.compute_total_size(), u64::MAX);
    }

    #[test]
    fn test_dropped_cache_vanishes_silently() {
        let group = CachesGroup::new(CacheLabel::of_table_name("T"));
        let kept = FixedCache::new(2);
        let dropped = FixedCache::new(5);
        add(&group, &kept);
        add(&group, &dropped);
        assert_eq!(group.compute_total_size(), 7);

        drop(dropped);

        assert_eq!(group.live_count(), 1);
        assert_eq!(group.compute_total_size(), 2);
        assert_eq!(group.invalidate_all_no_fail(), 2);
    }

    #[test]
    fn test_re_adding_same_id_replaces_entry() {
        let group = CachesGroup::new(CacheLabel::of_table_name("T"));
        let cache = FixedCache::new(4);
        add(&group, &cache);
        add(&group, &cache);

        assert_eq!(group.live_count(), 1);
        assert!(group.remove_cache(cache.id));
        assert!(!group.remove_cache(cache.id));
        assert_eq!(group.invalidate_all_no_fail(), 0);
    }
}
