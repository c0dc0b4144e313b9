// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction host abstraction
//!
//! The coordinator does not manage transactions itself. It only needs to know
//! whether a transaction is still open and to be told when it commits or
//! closes.

use std::sync::Arc;

use super::{TransactionError, TransactionId};

/// Callback invoked with the id of the transaction that raised the event
pub type TrxEventHandler = Arc<dyn Fn(TransactionId) + Send + Sync>;

/// Transaction manager seen from the cache coordinator
pub trait TransactionHost: Send + Sync {
    /// Whether `transaction_id` names an open transaction
    fn is_active(&self, transaction_id: TransactionId) -> bool;

    /// Register a handler run after *every* successful commit of the transaction
    fn on_after_commit(
        &self,
        transaction_id: TransactionId,
        handler: TrxEventHandler,
    ) -> Result<(), TransactionError>;

    /// Register a handler run once when the transaction is closed
    fn on_after_close(
        &self,
        transaction_id: TransactionId,
        handler: TrxEventHandler,
    ) -> Result<(), TransactionError>;
}
