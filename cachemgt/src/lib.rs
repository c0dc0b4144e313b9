// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CacheMgt - process-wide cache invalidation coordinator
//!
//! CacheMgt keeps track of the in-memory caches of a process and invalidates
//! them when the data they were built from changes.
//!
//! # Features
//!
//! - **Label registry**: caches register under table-name labels and are held weakly
//! - **Reset modes**: local, local and broadcast, or broadcast only
//! - **No-fail fan-out**: a failing cache or listener never aborts a reset
//! - **Full reset guard**: re-entrant full resets are skipped
//! - **Transaction deferral**: broadcasts are held back until the transaction commits
//!
//! # Usage
//!
//! ```rust,ignore
//! use cachemgt::{CacheMgt, CacheMgtConfig};
//! use std::sync::Arc;
//!
//! let cache_mgt = Arc::new(CacheMgt::new(CacheMgtConfig::default()));
//! cache_mgt.register(&my_cache)?;
//!
//! // A row of C_Order changed
//! cache_mgt.reset_record("C_Order", Some(1000));
//! ```

pub mod cache;
pub mod coordinator;
pub mod remote;
pub mod txn;

pub use cache::{
    CacheError, CacheId, CacheInterface, CacheInvalidateMultiRequest, CacheInvalidateRequest,
    CacheLabel, CacheMgtConfig, CacheResetListener, CachesGroup, ResetMode, RunMode,
    TableRecordReference,
};
pub use coordinator::{CacheMgt, CacheMgtStats};
pub use remote::{NoopRemoteHandler, RemoteInvalidationHandler};
pub use txn::{
    InMemoryTransactionHost, TransactionError, TransactionHost, TransactionId, TrxEventHandler,
};

/// CacheMgt version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CacheMgt crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
