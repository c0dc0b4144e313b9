// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Reset modes: where an invalidation request is executed

use serde::{Deserialize, Serialize};

/// How a reset request is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetMode {
    /// Invalidate the caches of this process only
    Local,
    /// Invalidate locally and post the request to other processes
    LocalAndBroadcast,
    /// Only post the request to other processes
    JustBroadcast,
}

impl ResetMode {
    pub fn is_reset_local(&self) -> bool {
        matches!(self, ResetMode::Local | ResetMode::LocalAndBroadcast)
    }

    pub fn is_broadcast(&self) -> bool {
        matches!(self, ResetMode::LocalAndBroadcast | ResetMode::JustBroadcast)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResetMode::Local => "LOCAL",
            ResetMode::LocalAndBroadcast => "LOCAL_AND_BROADCAST",
            ResetMode::JustBroadcast => "JUST_BROADCAST",
        }
    }
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
