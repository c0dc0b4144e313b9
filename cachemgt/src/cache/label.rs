// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache labels used to group registered caches

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping key for registered caches, usually one per table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheLabel(String);

impl CacheLabel {
    /// Label under which caches of the given table are filed
    pub fn of_table_name(table_name: &str) -> Self {
        CacheLabel(table_name.to_string())
    }

    /// Free-form label, for caches that are not bound to a single table
    pub fn of_string(label: impl Into<String>) -> Self {
        CacheLabel(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_table_name(&self, table_name: &str) -> bool {
        self.0 == table_name
    }
}

impl fmt::Display for CacheLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheLabel {
    fn from(label: &str) -> Self {
        CacheLabel(label.to_string())
    }
}
