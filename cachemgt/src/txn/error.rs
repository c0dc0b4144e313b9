// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction error types

use super::TransactionId;
use thiserror::Error;

/// Transaction host errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction {0} not found")]
    NotFound(TransactionId),

    #[error("Transaction {0} is not active")]
    NotActive(TransactionId),
}
