// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache coordination error types

use crate::txn::TransactionError;
use thiserror::Error;

/// Errors raised by the cache coordinator and by registered caches
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cache reset failed: {0}")]
    ResetFailed(String),

    #[error("Cache reset listener failed: {0}")]
    ListenerFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::Config(error.to_string())
    }
}
