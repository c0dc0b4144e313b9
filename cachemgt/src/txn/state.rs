// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction state management
//!
//! This module defines the transaction identity and lifecycle state tracked by
//! the in-memory transaction host.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Generate a new process-unique transaction ID
    pub fn new() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the underlying ID value
    pub fn id(&self) -> u64 {
        self.0
    }

    /// Create TransactionId from u64 (ids handed out by an external transaction manager)
    pub fn from_u64(id: u64) -> Self {
        TransactionId(id)
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

/// Transaction lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction is open; it may commit or roll back any number of times
    Active,
    /// Transaction was closed and cannot be used anymore
    Closed,
}

/// Lifecycle state of one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionState {
    /// Unique transaction identifier
    pub id: TransactionId,
    /// Current transaction status
    pub status: TransactionStatus,
    /// Timestamp when transaction started
    pub start_time: SystemTime,
    /// Timestamp when transaction was closed (if applicable)
    pub end_time: Option<SystemTime>,
    /// Number of successful commits
    pub commit_count: u64,
    /// Number of rollbacks
    pub rollback_count: u64,
}

impl TransactionState {
    pub fn new() -> Self {
        Self {
            id: TransactionId::new(),
            status: TransactionStatus::Active,
            start_time: SystemTime::now(),
            end_time: None,
            commit_count: 0,
            rollback_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    pub fn commit(&mut self) {
        self.commit_count += 1;
    }

    pub fn rollback(&mut self) {
        self.rollback_count += 1;
    }

    /// Mark transaction as closed
    pub fn close(&mut self) {
        self.status = TransactionStatus::Closed;
        self.end_time = Some(SystemTime::now());
    }
}

impl Default for TransactionState {
    fn default() -> Self {
        Self::new()
    }
}
