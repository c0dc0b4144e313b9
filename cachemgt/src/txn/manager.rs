// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory transaction host
//!
//! A minimal transaction manager for embedding and tests. Transactions stay
//! open across commits until they are closed, which is the lifecycle the
//! commit-deferred cache invalidation is built for.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use super::host::{TransactionHost, TrxEventHandler};
use super::state::TransactionState;
use super::{TransactionError, TransactionId};

struct TransactionEntry {
    state: TransactionState,
    after_commit: Vec<TrxEventHandler>,
    after_close: Vec<TrxEventHandler>,
}

/// Transaction host keeping all state in memory
#[derive(Default)]
pub struct InMemoryTransactionHost {
    /// Map of open transactions by ID
    transactions: RwLock<HashMap<TransactionId, Arc<Mutex<TransactionEntry>>>>,
}

impl InMemoryTransactionHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Arc<Mutex<TransactionEntry>>, TransactionError> {
        self.transactions
            .read()
            .get(&transaction_id)
            .cloned()
            .ok_or(TransactionError::NotFound(transaction_id))
    }

    /// Start a new transaction
    pub fn begin(&self) -> TransactionId {
        let state = TransactionState::new();
        let transaction_id = state.id;
        let entry = TransactionEntry {
            state,
            after_commit: Vec::new(),
            after_close: Vec::new(),
        };

        self.transactions
            .write()
            .insert(transaction_id, Arc::new(Mutex::new(entry)));
        log::debug!("BEGIN {}", transaction_id);

        transaction_id
    }

    /// Commit a transaction and run its after-commit handlers
    ///
    /// The transaction stays open and may be committed again.
    pub fn commit(&self, transaction_id: TransactionId) -> Result<(), TransactionError> {
        let entry = self.entry(transaction_id)?;
        let handlers = {
            let mut entry = entry.lock();
            if !entry.state.is_active() {
                return Err(TransactionError::NotActive(transaction_id));
            }
            entry.state.commit();
            entry.after_commit.clone()
        };

        log::debug!(
            "COMMIT {} ({} after-commit handlers)",
            transaction_id,
            handlers.len()
        );
        for handler in handlers {
            handler(transaction_id);
        }
        Ok(())
    }

    /// Roll back a transaction; after-commit handlers are not run
    pub fn rollback(&self, transaction_id: TransactionId) -> Result<(), TransactionError> {
        let entry = self.entry(transaction_id)?;
        let mut entry = entry.lock();
        if !entry.state.is_active() {
            return Err(TransactionError::NotActive(transaction_id));
        }
        entry.state.rollback();
        log::debug!("ROLLBACK {}", transaction_id);
        Ok(())
    }

    /// Close a transaction and run its after-close handlers
    pub fn close(&self, transaction_id: TransactionId) -> Result<(), TransactionError> {
        let entry = self
            .transactions
            .write()
            .remove(&transaction_id)
            .ok_or(TransactionError::NotFound(transaction_id))?;

        let handlers = {
            let mut entry = entry.lock();
            entry.state.close();
            entry.after_commit.clear();
            std::mem::take(&mut entry.after_close)
        };

        log::debug!("CLOSE {}", transaction_id);
        for handler in handlers {
            handler(transaction_id);
        }
        Ok(())
    }

    /// Get a snapshot of the transaction state
    pub fn get_transaction(&self, transaction_id: TransactionId) -> Option<TransactionState> {
        self.transactions
            .read()
            .get(&transaction_id)
            .map(|entry| entry.lock().state.clone())
    }

    /// Get all open transaction IDs
    pub fn get_active_transaction_ids(&self) -> Vec<TransactionId> {
        self.transactions
            .read()
            .iter()
            .filter(|(_, entry)| entry.lock().state.is_active())
            .map(|(id, _)| *id)
            .collect()
    }
}

impl TransactionHost for InMemoryTransactionHost {
    fn is_active(&self, transaction_id: TransactionId) -> bool {
        self.transactions
            .read()
            .get(&transaction_id)
            .map(|entry| entry.lock().state.is_active())
            .unwrap_or(false)
    }

    fn on_after_commit(
        &self,
        transaction_id: TransactionId,
        handler: TrxEventHandler,
    ) -> Result<(), TransactionError> {
        let entry = self.entry(transaction_id)?;
        let mut entry = entry.lock();
        if !entry.state.is_active() {
            return Err(TransactionError::NotActive(transaction_id));
        }
        entry.after_commit.push(handler);
        Ok(())
    }

    fn on_after_close(
        &self,
        transaction_id: TransactionId,
        handler: TrxEventHandler,
    ) -> Result<(), TransactionError> {
        let entry = self.entry(transaction_id)?;
        let mut entry = entry.lock();
        if !entry.state.is_active() {
            return Err(TransactionError::NotActive(transaction_id));
        }
        entry.after_close.push(handler);
        Ok(())
    }
}
