// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CacheMgt - process-wide cache invalidation coordinator
//!
//! Caches register themselves under one or more labels. Reset requests are
//! routed to the matching label groups, listeners are notified, and requests
//! are handed to the remote gateway when the reset mode says so. Inside an
//! open transaction the broadcast part can be deferred until commit.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::stats::CacheMgtStats;
use crate::cache::{
    CacheError, CacheInterface, CacheInvalidateMultiRequest, CacheInvalidateRequest, CacheLabel,
    CacheMgtConfig, CacheResetListener, CachesGroup, ListenerRegistry, ResetMode,
    TableRecordReference,
};
use crate::remote::{NoopRemoteHandler, RemoteInvalidationHandler};
use crate::txn::{TransactionHost, TransactionId, TrxEventHandler, TrxResetCollector};

/// Holds the full-reset flag for the duration of one `reset_all`
struct ResetAllGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> ResetAllGuard<'a> {
    fn acquire(running: &'a AtomicBool) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { running })
    }
}

impl Drop for ResetAllGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Cache invalidation coordinator
///
/// Usually one instance per process, shared as `Arc<CacheMgt>` (see
/// [`crate::coordinator::global`]). Tests construct isolated instances.
pub struct CacheMgt {
    config: CacheMgtConfig,

    /// Registered caches grouped by label
    caches_by_label: RwLock<HashMap<CacheLabel, Arc<CachesGroup>>>,

    /// Global and per-table reset listeners
    listeners: ListenerRegistry,

    /// Cross-process broadcast
    remote_handler: Arc<dyn RemoteInvalidationHandler>,

    /// Transaction manager used for commit-deferred resets
    transaction_host: Option<Arc<dyn TransactionHost>>,

    /// Deferred requests per open transaction
    trx_collectors: Mutex<HashMap<TransactionId, Arc<TrxResetCollector>>>,

    /// Guards against re-entrant full resets
    cache_reset_running: AtomicBool,

    /// Number of completed full resets
    last_cache_reset: AtomicU64,
    last_reset_at: RwLock<Option<DateTime<Utc>>>,
}

impl CacheMgt {
    /// Create a coordinator without remote transport and without transaction host
    pub fn new(config: CacheMgtConfig) -> Self {
        let remote_handler: Arc<dyn RemoteInvalidationHandler> =
            Arc::new(NoopRemoteHandler::new());
        for table_name in &config.remote_invalidation_tables {
            remote_handler.enable_for_table_name(table_name);
        }

        Self {
            config,
            caches_by_label: RwLock::new(HashMap::new()),
            listeners: ListenerRegistry::new(),
            remote_handler,
            transaction_host: None,
            trx_collectors: Mutex::new(HashMap::new()),
            cache_reset_running: AtomicBool::new(false),
            last_cache_reset: AtomicU64::new(0),
            last_reset_at: RwLock::new(None),
        }
    }

    /// Use `remote_handler` for broadcasts; tables from the configuration are enabled on it
    pub fn with_remote_handler(
        mut self,
        remote_handler: Arc<dyn RemoteInvalidationHandler>,
    ) -> Self {
        for table_name in &self.config.remote_invalidation_tables {
            remote_handler.enable_for_table_name(table_name);
        }
        self.remote_handler = remote_handler;
        self
    }

    pub fn with_transaction_host(mut self, transaction_host: Arc<dyn TransactionHost>) -> Self {
        self.transaction_host = Some(transaction_host);
        self
    }

    pub fn config(&self) -> &CacheMgtConfig {
        &self.config
    }

    fn get_caches_group(&self, label: &CacheLabel) -> Arc<CachesGroup> {
        if let Some(group) = self.caches_by_label.read().get(label) {
            return group.clone();
        }

        self.caches_by_label
            .write()
            .entry(label.clone())
            .or_insert_with(|| Arc::new(CachesGroup::new(label.clone())))
            .clone()
    }

    fn get_caches_group_if_present(&self, label: &CacheLabel) -> Option<Arc<CachesGroup>> {
        self.caches_by_label.read().get(label).cloned()
    }

    fn caches_groups(&self) -> Vec<Arc<CachesGroup>> {
        self.caches_by_label.read().values().cloned().collect()
    }

    /// Register `cache` under each of its labels
    ///
    /// Only a weak reference is kept: the cache disappears from the registry
    /// when its last owner drops it. Registering the same cache id again
    /// replaces the previous entry.
    pub fn register<C>(&self, cache: &Arc<C>) -> Result<(), CacheError>
    where
        C: CacheInterface + 'static,
    {
        let cache: Arc<dyn CacheInterface> = cache.clone();
        self.register_dyn(&cache)
    }

    /// Same as [`CacheMgt::register`], for caches held as trait objects
    pub fn register_dyn(&self, cache: &Arc<dyn CacheInterface>) -> Result<(), CacheError> {
        let labels = cache.labels();
        if labels.is_empty() {
            return Err(CacheError::InvalidArgument(format!(
                "{} has no labels",
                cache.cache_id()
            )));
        }

        let cache_id = cache.cache_id();
        let weak = Arc::downgrade(cache);
        for label in &labels {
            self.get_caches_group(label).add_cache(cache_id, weak.clone());
        }
        Ok(())
    }

    /// Remove `cache` from every group it declared; no-op if it was not registered
    pub fn unregister(&self, cache: &dyn CacheInterface) {
        let cache_id = cache.cache_id();
        for label in cache.labels() {
            if let Some(group) = self.get_caches_group_if_present(&label) {
                group.remove_cache(cache_id);
            }
        }
    }

    pub fn cache_labels(&self) -> HashSet<CacheLabel> {
        self.caches_by_label.read().keys().cloned().collect()
    }

    /// Allow caches of `table_name` to be invalidated by remote events
    pub fn enable_remote_cache_invalidation_for_table_name(&self, table_name: &str) {
        self.remote_handler.enable_for_table_name(table_name);
    }

    pub fn table_names_to_broadcast(&self) -> HashSet<String> {
        self.remote_handler.table_names_to_broadcast()
    }

    /// Generation counter, incremented after every completed full reset
    pub fn last_cache_reset(&self) -> u64 {
        self.last_cache_reset.load(Ordering::Acquire)
    }

    pub fn last_reset_at(&self) -> Option<DateTime<Utc>> {
        *self.last_reset_at.read()
    }

    /// Invalidate every registered cache
    ///
    /// Returns how many entries were invalidated. A call made while another
    /// full reset is running (e.g. from a listener) returns 0 immediately.
    pub fn reset_all(&self) -> u64 {
        let started = Instant::now();

        let Some(guard) = ResetAllGuard::acquire(&self.cache_reset_running) else {
            log::trace!("Avoid calling full cache reset again. We are currently doing it...");
            return 0;
        };

        let total: u64 = self
            .caches_groups()
            .iter()
            .map(|group| group.invalidate_all_no_fail())
            .fold(0, u64::saturating_add);

        self.listeners.fire(&CacheInvalidateMultiRequest::all());

        self.last_cache_reset.fetch_add(1, Ordering::AcqRel);
        *self.last_reset_at.write() = Some(Utc::now());
        drop(guard);

        log::info!(
            "Reset all: cache instances invalidated ({} cached items invalidated). Took {:?}",
            total,
            started.elapsed()
        );
        total
    }

    /// Invalidate all records of `table_name`, here and in other processes
    pub fn reset_table(&self, table_name: &str) -> u64 {
        let request = CacheInvalidateMultiRequest::all_records_for_table(table_name);
        self.reset(&request, ResetMode::LocalAndBroadcast)
    }

    /// Invalidate all records of `table_name` in this process only
    pub fn reset_table_local(&self, table_name: &str) -> u64 {
        let request = CacheInvalidateMultiRequest::all_records_for_table(table_name);
        self.reset(&request, ResetMode::Local)
    }

    /// Invalidate one record, or the whole table for a negative or missing id
    ///
    /// Broadcasts unless the coordinator runs in unit test mode.
    pub fn reset_record(&self, table_name: &str, record_id: Option<i64>) -> u64 {
        let mode = if self.config.run_mode.is_unit_test_mode() {
            ResetMode::Local
        } else {
            ResetMode::LocalAndBroadcast
        };
        self.reset_record_with_mode(table_name, record_id, mode)
    }

    pub fn reset_record_with_mode(
        &self,
        table_name: &str,
        record_id: Option<i64>,
        mode: ResetMode,
    ) -> u64 {
        let request =
            CacheInvalidateMultiRequest::from_table_name_and_record_id(table_name, record_id);
        self.reset(&request, mode)
    }

    /// Execute `request` according to `mode`
    ///
    /// Returns the number of locally invalidated entries (0 for
    /// [`ResetMode::JustBroadcast`]). The request is broadcast even if no
    /// cache is registered locally for it.
    pub fn reset(&self, request: &CacheInvalidateMultiRequest, mode: ResetMode) -> u64 {
        let reset_count = if mode.is_reset_local() {
            let reset_count = self.invalidate_for_multi_request(request);
            // A full reset notifies the listeners itself.
            if !request.is_reset_all() {
                self.listeners.fire(request);
            }
            reset_count
        } else {
            0
        };

        if mode.is_broadcast() {
            log::debug!("Broadcasting cache invalidation {}", request);
            self.remote_handler.post_event(request);
        }

        reset_count
    }

    fn invalidate_for_multi_request(&self, request: &CacheInvalidateMultiRequest) -> u64 {
        if request.is_reset_all() {
            return self.reset_all();
        }

        request
            .requests()
            .iter()
            .map(|single| self.invalidate_for_request(single))
            .fold(0, u64::saturating_add)
    }

    fn invalidate_for_request(&self, request: &CacheInvalidateRequest) -> u64 {
        if request.is_all_records() {
            let label = CacheLabel::of_table_name(request.table_name_effective());
            return match self.get_caches_group_if_present(&label) {
                Some(group) => group.invalidate_all_no_fail(),
                None => 0,
            };
        }

        let mut reset_count: u64 = 0;
        if let Some(child) = request.child_record() {
            reset_count = reset_count.saturating_add(self.invalidate_for_record(child));
        }
        if let Some(root) = request.root_record() {
            reset_count = reset_count.saturating_add(self.invalidate_for_record(root));
        }
        reset_count
    }

    fn invalidate_for_record(&self, record: &TableRecordReference) -> u64 {
        let label = CacheLabel::of_table_name(&record.table_name);
        match self.get_caches_group_if_present(&label) {
            Some(group) => group.invalidate_for_record_no_fail(record),
            None => 0,
        }
    }

    /// Reset locally now and broadcast when `transaction_id` commits
    ///
    /// Without an open transaction this is an immediate
    /// [`ResetMode::LocalAndBroadcast`] reset.
    pub fn reset_local_now_and_broadcast_on_trx_commit(
        self: &Arc<Self>,
        transaction_id: Option<TransactionId>,
        request: &CacheInvalidateMultiRequest,
    ) {
        match self.trx_collector_if_active(transaction_id) {
            Some(collector) => {
                self.reset(request, ResetMode::Local);
                collector.add_record(request, ResetMode::JustBroadcast);
            }
            None => {
                self.reset(request, ResetMode::LocalAndBroadcast);
            }
        }
    }

    /// Execute `request` with `mode` when `transaction_id` commits
    ///
    /// Without an open transaction the request is executed right away.
    pub fn reset_on_trx_commit(
        self: &Arc<Self>,
        transaction_id: Option<TransactionId>,
        request: &CacheInvalidateMultiRequest,
        mode: ResetMode,
    ) {
        match self.trx_collector_if_active(transaction_id) {
            Some(collector) => collector.add_record(request, mode),
            None => {
                self.reset(request, mode);
            }
        }
    }

    /// Number of requests waiting for the commit of `transaction_id`
    pub fn pending_on_trx_commit(&self, transaction_id: TransactionId) -> usize {
        self.trx_collectors
            .lock()
            .get(&transaction_id)
            .map(|collector| collector.len())
            .unwrap_or(0)
    }

    /// Get or create the collector of an open transaction
    fn trx_collector_if_active(
        self: &Arc<Self>,
        transaction_id: Option<TransactionId>,
    ) -> Option<Arc<TrxResetCollector>> {
        let transaction_id = transaction_id?;
        let host = self.transaction_host.as_ref()?;
        if !host.is_active(transaction_id) {
            return None;
        }

        if let Some(collector) = self.trx_collectors.lock().get(&transaction_id) {
            return Some(collector.clone());
        }

        // Hooks are registered without holding the collectors lock: a host may
        // run a handler synchronously from inside the registration call.
        let collector = Arc::new(TrxResetCollector::new(transaction_id));

        // Runs on every commit, not just the first one.
        let cache_mgt = Arc::downgrade(self);
        let commit_collector = collector.clone();
        let on_commit: TrxEventHandler = Arc::new(move |_: TransactionId| {
            if let Some(cache_mgt) = cache_mgt.upgrade() {
                commit_collector.send_requests_and_clear(&cache_mgt);
            }
        });
        if let Err(e) = host.on_after_commit(transaction_id, on_commit) {
            log::debug!("Cannot defer cache invalidation to {}: {}", transaction_id, e);
            return None;
        }

        let cache_mgt = Arc::downgrade(self);
        let on_close: TrxEventHandler = Arc::new(move |transaction_id: TransactionId| {
            if let Some(cache_mgt) = cache_mgt.upgrade() {
                cache_mgt.trx_collectors.lock().remove(&transaction_id);
            }
        });
        if let Err(e) = host.on_after_close(transaction_id, on_close) {
            log::debug!(
                "Collector of {} will not be released on close: {}",
                transaction_id,
                e
            );
        }

        // The transaction may have closed while the hooks were registered.
        if !host.is_active(transaction_id) {
            return None;
        }

        // A concurrent caller may have installed a collector meanwhile. Theirs
        // is kept and the hooks registered here flush an empty collector.
        let collector = self
            .trx_collectors
            .lock()
            .entry(transaction_id)
            .or_insert(collector)
            .clone();
        Some(collector)
    }

    /// Listener fired on every local reset
    pub fn add_cache_reset_listener(&self, listener: Arc<dyn CacheResetListener>) {
        self.listeners.add_global(listener);
    }

    pub fn remove_cache_reset_listener(&self, listener: &Arc<dyn CacheResetListener>) -> bool {
        self.listeners.remove_global(listener)
    }

    /// Listener fired when caches of `table_name` are reset (and on every full reset)
    pub fn add_table_cache_reset_listener(
        &self,
        table_name: &str,
        listener: Arc<dyn CacheResetListener>,
    ) {
        self.listeners.add_for_table(table_name, listener);
    }

    pub fn remove_table_cache_reset_listener(
        &self,
        table_name: &str,
        listener: &Arc<dyn CacheResetListener>,
    ) -> bool {
        self.listeners.remove_for_table(table_name, listener)
    }

    /// How many entries all registered caches hold together
    pub fn compute_total_size(&self) -> u64 {
        self.caches_groups()
            .iter()
            .map(|group| group.compute_total_size())
            .fold(0, u64::saturating_add)
    }

    pub fn stats(&self) -> CacheMgtStats {
        let groups = self.caches_groups();
        CacheMgtStats {
            labels: groups.len(),
            cache_instances: groups.iter().map(|group| group.live_count()).sum(),
            total_size: groups
                .iter()
                .map(|group| group.compute_total_size())
                .fold(0, u64::saturating_add),
            reset_generation: self.last_cache_reset(),
            last_reset_at: self.last_reset_at(),
            pending_transactions: self.trx_collectors.lock().len(),
        }
    }
}

impl fmt::Display for CacheMgt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheMgt[Instances={}]", self.caches_by_label.read().len())
    }
}
