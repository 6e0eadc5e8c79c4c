//! Transaction entity helper shared by every handler.

use alloy_primitives::B256;

use crate::entities::Transaction;
use crate::events::ChainEvent;
use crate::store::EntityStore;

/// Returns the hash of the transaction that emitted `event`, creating its
/// [`Transaction`] entity on first sight.
pub fn create_transaction_entity<S>(store: &S, event: &ChainEvent) -> B256
where
    S: EntityStore + ?Sized,
{
    let hash = event.transaction.hash;
    if store.transaction(&hash).is_none() {
        let transaction = Transaction {
            id: hash,
            block_number: event.block.number,
            timestamp: event.block.timestamp,
            from: event.transaction.from,
        };
        let time = transaction
            .timestamp_utc()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        store.save_transaction(transaction);
        tracing::trace!(tx = %hash, block = event.block.number, %time, "transaction created");
    }
    hash
}
