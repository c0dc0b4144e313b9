//! Tests for cache reset listeners
//!
//! Global and table listeners, identity de-duplication, failing listeners
//! and full resets triggered from inside a listener.

#[path = "testutils/mod.rs"]
mod testutils;

use cachemgt::{
    CacheError, CacheInvalidateMultiRequest, CacheMgt, CacheMgtConfig, CacheResetListener,
    ResetMode,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use testutils::{init_logging, TestCache};

/// Listener counting its notifications
#[derive(Default)]
struct CountingListener {
    notifications: AtomicUsize,
    seen: Mutex<Vec<CacheInvalidateMultiRequest>>,
}

impl CountingListener {
    fn notifications(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }
}

impl CacheResetListener for CountingListener {
    fn on_reset(&self, request: &CacheInvalidateMultiRequest) -> Result<(), CacheError> {
        self.notifications.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(request.clone());
        Ok(())
    }
}

#[test]
fn test_same_table_listener_added_twice_fires_once() {
    let cache_mgt = CacheMgt::new(CacheMgtConfig::default());
    let counting = Arc::new(CountingListener::default());
    let listener: Arc<dyn CacheResetListener> = counting.clone();

    cache_mgt.add_table_cache_reset_listener("T", listener.clone());
    cache_mgt.add_table_cache_reset_listener("T", listener.clone());

    cache_mgt.reset_table_local("T");
    assert_eq!(counting.notifications(), 1);

    cache_mgt.reset_table_local("U");
    assert_eq!(counting.notifications(), 1);

    assert!(cache_mgt.remove_table_cache_reset_listener("T", &listener));
    assert!(!cache_mgt.remove_table_cache_reset_listener("T", &listener));
    cache_mgt.reset_table_local("T");
    assert_eq!(counting.notifications(), 1);
}

#[test]
fn test_global_listener_sees_every_local_reset() {
    let cache_mgt = CacheMgt::new(CacheMgtConfig::default());
    let counting = Arc::new(CountingListener::default());
    let listener: Arc<dyn CacheResetListener> = counting.clone();
    cache_mgt.add_cache_reset_listener(listener.clone());

    cache_mgt.reset_table_local("A");
    cache_mgt.reset_record_with_mode("B", Some(3), ResetMode::Local);
    // Broadcast only: nothing reset here
    cache_mgt.reset_record_with_mode("C", Some(4), ResetMode::JustBroadcast);
    cache_mgt.reset_all();

    assert_eq!(
        *counting.seen.lock(),
        vec![
            CacheInvalidateMultiRequest::all_records_for_table("A"),
            CacheInvalidateMultiRequest::from_table_name_and_record_id("B", Some(3)),
            CacheInvalidateMultiRequest::all(),
        ]
    );

    assert!(cache_mgt.remove_cache_reset_listener(&listener));
    cache_mgt.reset_all();
    assert_eq!(counting.notifications(), 3);
}

#[test]
fn test_reset_all_request_notifies_listeners_once() {
    let cache_mgt = CacheMgt::new(CacheMgtConfig::default());
    let counting = Arc::new(CountingListener::default());
    cache_mgt.add_table_cache_reset_listener("T", counting.clone());

    cache_mgt.reset(&CacheInvalidateMultiRequest::all(), ResetMode::Local);
    assert_eq!(counting.notifications(), 1);
}

#[test]
fn test_failing_listeners_are_isolated() {
    init_logging();
    let cache_mgt = CacheMgt::new(CacheMgtConfig::default());
    let cache = Arc::new(TestCache::new(&["T"], 5));
    cache_mgt.register(&cache).unwrap();

    let erroring = |_: &CacheInvalidateMultiRequest| -> Result<(), CacheError> {
        Err(CacheError::ListenerFailed("boom".to_string()))
    };
    let panicking = |_: &CacheInvalidateMultiRequest| -> Result<(), CacheError> {
        panic!("listener panicked");
    };
    let counting = Arc::new(CountingListener::default());
    cache_mgt.add_table_cache_reset_listener("T", Arc::new(erroring));
    cache_mgt.add_table_cache_reset_listener("T", Arc::new(panicking));
    cache_mgt.add_table_cache_reset_listener("T", counting.clone());

    assert_eq!(cache_mgt.reset_table_local("T"), 5);
    assert_eq!(counting.notifications(), 1);
}

/// Listener calling `reset_all` on the coordinator that notified it
struct ReentrantListener {
    cache_mgt: Mutex<Weak<CacheMgt>>,
    inner_results: Mutex<Vec<u64>>,
    calls: AtomicU64,
}

impl CacheResetListener for ReentrantListener {
    fn on_reset(&self, _request: &CacheInvalidateMultiRequest) -> Result<(), CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(cache_mgt) = self.cache_mgt.lock().upgrade() {
            self.inner_results.lock().push(cache_mgt.reset_all());
        }
        Ok(())
    }
}

#[test]
fn test_reset_all_from_listener_is_skipped() {
    init_logging();
    let cache_mgt = Arc::new(CacheMgt::new(CacheMgtConfig::default()));
    let cache = Arc::new(TestCache::new(&["A"], 9));
    cache_mgt.register(&cache).unwrap();

    let listener = Arc::new(ReentrantListener {
        cache_mgt: Mutex::new(Arc::downgrade(&cache_mgt)),
        inner_results: Mutex::new(Vec::new()),
        calls: AtomicU64::new(0),
    });
    cache_mgt.add_cache_reset_listener(listener.clone());

    assert_eq!(cache_mgt.reset_all(), 9);
    assert_eq!(*listener.inner_results.lock(), vec![0]);
    assert_eq!(listener.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache_mgt.last_cache_reset(), 1);

    // The guard is released afterwards
    cache.fill(2);
    *listener.cache_mgt.lock() = Weak::new();
    assert_eq!(cache_mgt.reset_all(), 2);
    assert_eq!(cache_mgt.last_cache_reset(), 2);
}
