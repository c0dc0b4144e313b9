// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Remote broadcast gateway contract

use std::collections::HashSet;

use crate::cache::CacheInvalidateMultiRequest;

/// Gateway that propagates invalidation requests to other processes
///
/// Implementations must not block for long: `post_event` is called on the
/// thread that issued the reset.
pub trait RemoteInvalidationHandler: Send + Sync {
    /// Post a request to other processes; no acknowledgment is expected
    fn post_event(&self, request: &CacheInvalidateMultiRequest);

    /// Tables for which remote invalidation is enabled
    fn table_names_to_broadcast(&self) -> HashSet<String>;

    /// Opt a table into remote invalidation
    fn enable_for_table_name(&self, table_name: &str);
}
