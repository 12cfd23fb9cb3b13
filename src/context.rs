//! Per-transaction execution context supplied by the ledger dispatcher.

use crate::types::{Address, TransactionId};

/// Transaction being applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    pub id: TransactionId,
    pub timestamp: u64,
}

/// Everything a handler may know about the call it is serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    pub sender: Address,
    pub transaction: TransactionInfo,
    /// Height of the block the transaction is applied in.
    pub block_height: u64,
}

impl TxContext {
    pub fn new(
        sender: Address,
        transaction_id: TransactionId,
        timestamp: u64,
        block_height: u64,
    ) -> Self {
        Self {
            sender,
            transaction: TransactionInfo {
                id: transaction_id,
                timestamp,
            },
            block_height,
        }
    }
}
