// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache reset listeners
//!
//! Listeners are notified synchronously after a local reset. Global listeners
//! fire on every reset; table listeners fire when their table is named in the
//! request, or on a reset-all. Registration is by identity: adding the same
//! listener twice is a no-op.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::no_fail::call_no_fail;
use super::{CacheError, CacheInvalidateMultiRequest};

/// Notified after caches were reset
pub trait CacheResetListener: Send + Sync {
    fn on_reset(&self, request: &CacheInvalidateMultiRequest) -> Result<(), CacheError>;
}

impl<F> CacheResetListener for F
where
    F: Fn(&CacheInvalidateMultiRequest) -> Result<(), CacheError> + Send + Sync,
{
    fn on_reset(&self, request: &CacheInvalidateMultiRequest) -> Result<(), CacheError> {
        self(request)
    }
}

type ListenerList = Arc<Vec<Arc<dyn CacheResetListener>>>;

fn same_listener(a: &Arc<dyn CacheResetListener>, b: &Arc<dyn CacheResetListener>) -> bool {
    // Compare data pointers only; vtable pointers are not unique.
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Copy-on-write append; returns false if the listener was already present
fn add_if_absent(list: &mut ListenerList, listener: Arc<dyn CacheResetListener>) -> bool {
    if list.iter().any(|existing| same_listener(existing, &listener)) {
        return false;
    }
    let mut updated = Vec::with_capacity(list.len() + 1);
    updated.extend(list.iter().cloned());
    updated.push(listener);
    *list = Arc::new(updated);
    true
}

fn remove(list: &mut ListenerList, listener: &Arc<dyn CacheResetListener>) -> bool {
    if !list.iter().any(|existing| same_listener(existing, listener)) {
        return false;
    }
    let updated = list
        .iter()
        .filter(|existing| !same_listener(existing, listener))
        .cloned()
        .collect();
    *list = Arc::new(updated);
    true
}

/// Global and per-table listener lists
#[derive(Default)]
pub struct ListenerRegistry {
    global: RwLock<ListenerList>,
    by_table_name: RwLock<HashMap<String, ListenerList>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_global(&self, listener: Arc<dyn CacheResetListener>) -> bool {
        add_if_absent(&mut self.global.write(), listener)
    }

    pub fn remove_global(&self, listener: &Arc<dyn CacheResetListener>) -> bool {
        remove(&mut self.global.write(), listener)
    }

    pub fn add_for_table(&self, table_name: &str, listener: Arc<dyn CacheResetListener>) -> bool {
        let mut by_table_name = self.by_table_name.write();
        let list = by_table_name.entry(table_name.to_string()).or_default();
        add_if_absent(list, listener)
    }

    pub fn remove_for_table(
        &self,
        table_name: &str,
        listener: &Arc<dyn CacheResetListener>,
    ) -> bool {
        match self.by_table_name.write().get_mut(table_name) {
            Some(list) => remove(list, listener),
            None => false,
        }
    }

    /// Listeners to notify for `request`, in registration order, globals first
    pub fn listeners_for(
        &self,
        request: &CacheInvalidateMultiRequest,
    ) -> Vec<Arc<dyn CacheResetListener>> {
        let mut listeners: Vec<Arc<dyn CacheResetListener>> =
            self.global.read().iter().cloned().collect();

        let by_table_name = self.by_table_name.read();
        if request.is_reset_all() {
            for list in by_table_name.values() {
                listeners.extend(list.iter().cloned());
            }
        } else {
            for table_name in request.table_names_effective() {
                if let Some(list) = by_table_name.get(table_name) {
                    listeners.extend(list.iter().cloned());
                }
            }
        }

        listeners
    }

    /// Notify every matching listener; failures are logged and skipped
    pub fn fire(&self, request: &CacheInvalidateMultiRequest) {
        // Snapshot first: listeners may register other listeners while being notified.
        for listener in self.listeners_for(request) {
            if let Err(e) = call_no_fail(|| listener.on_reset(request)) {
                log::warn!(
                    "Failed firing cache reset listener for {}: {}. Ignored.",
                    request,
                    e
                );
            }
        }
    }
}
