// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction integration for deferred cache invalidation
//!
//! This module provides what the coordinator needs from transactions.
//!
//! # Features
//! - Transaction identity and lifecycle state
//! - The [`TransactionHost`] contract (activity check, after-commit and
//!   after-close hooks)
//! - An in-memory transaction host for embedding and tests
//! - Per-transaction collectors that hold invalidation requests until commit

pub mod collector;
pub mod error;
pub mod host;
pub mod manager;
pub mod state;

pub use collector::{PendingResets, TrxResetCollector};
pub use error::TransactionError;
pub use host::{TransactionHost, TrxEventHandler};
pub use manager::InMemoryTransactionHost;
pub use state::{TransactionId, TransactionState, TransactionStatus};
