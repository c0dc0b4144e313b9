// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Process-wide coordinator instance
//!
//! Components that cannot have the coordinator injected look it up here.
//! The first call to [`get`] creates a coordinator from the environment
//! configuration unless one was installed before with [`install`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cachemgt::coordinator::global;
//!
//! let cache_mgt = Arc::new(CacheMgt::new(config).with_transaction_host(host));
//! global::install(cache_mgt.clone());
//!
//! // elsewhere
//! global::get().reset_table("C_Order");
//! ```

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

use super::CacheMgt;
use crate::cache::CacheMgtConfig;

/// Process-wide coordinator
///
/// Using Lazy ensures thread-safe initialization on first access.
static GLOBAL_CACHE_MGT: Lazy<RwLock<Option<Arc<CacheMgt>>>> = Lazy::new(|| RwLock::new(None));

/// Get the installed coordinator, creating a default one on first access
pub fn get() -> Arc<CacheMgt> {
    if let Some(cache_mgt) = GLOBAL_CACHE_MGT.read().as_ref() {
        return cache_mgt.clone();
    }

    GLOBAL_CACHE_MGT
        .write()
        .get_or_insert_with(|| {
            let config = CacheMgtConfig::from_env().unwrap_or_else(|e| {
                log::warn!("Ignoring cache configuration from environment: {}", e);
                CacheMgtConfig::default()
            });
            log::info!("Global cache coordinator initialized ({:?})", config.run_mode);
            Arc::new(CacheMgt::new(config))
        })
        .clone()
}

/// Install `cache_mgt` as the process-wide coordinator, returning the previous one
pub fn install(cache_mgt: Arc<CacheMgt>) -> Option<Arc<CacheMgt>> {
    GLOBAL_CACHE_MGT.write().replace(cache_mgt)
}

/// Remove the installed coordinator; the next [`get`] creates a new one
pub fn uninstall() -> Option<Arc<CacheMgt>> {
    GLOBAL_CACHE_MGT.write().take()
}
