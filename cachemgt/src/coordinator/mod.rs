// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache Coordinator - central registry and reset orchestration
//!
//! [`CacheMgt`] owns the label to caches-group map, the listeners and the
//! transaction-deferred collectors, and routes every reset request.

pub mod cache_mgt;
pub mod global;
pub mod stats;

pub use cache_mgt::CacheMgt;
pub use stats::CacheMgtStats;
