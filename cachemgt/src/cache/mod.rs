// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache registry building blocks
//!
//! This module provides the pieces the coordinator is assembled from:
//! - Cache labels and invalidation requests
//! - Reset modes
//! - The capability trait registered caches implement
//! - Per-label cache groups with no-fail fan-out
//! - Reset listeners
//! - Configuration and errors

pub mod cache_config;
pub mod error;
pub mod group;
pub mod label;
pub mod listener;
mod no_fail;
pub mod request;
pub mod reset_mode;
pub mod traits;

pub use cache_config::{CacheMgtConfig, RunMode};
pub use error::CacheError;
pub use group::CachesGroup;
pub use label::CacheLabel;
pub use listener::{CacheResetListener, ListenerRegistry};
pub use request::{CacheInvalidateMultiRequest, CacheInvalidateRequest, TableRecordReference};
pub use reset_mode::ResetMode;
pub use traits::{CacheId, CacheInterface};
