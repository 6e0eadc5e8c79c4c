//! Deposit event mapping.

use crate::entities::{Deposit, EventId};
use crate::events::{ChainEvent, DepositParams};
use crate::store::EntityStore;

use super::transaction::create_transaction_entity;

/// Records a vault deposit.
///
/// Payload fields are copied verbatim. Re-running the same event rewrites
/// the same entity.
pub fn handle_deposit<S>(store: &S, event: &ChainEvent, params: &DepositParams) -> EventId
where
    S: EntityStore + ?Sized,
{
    let id = event.id();
    let transaction = create_transaction_entity(store, event);

    store.save_deposit(Deposit {
        id,
        amount: params.amount,
        sender: params.sender,
        vault_id: params.vault_id,
        token: params.token,
        transaction,
    });

    tracing::debug!(
        %id,
        sender = ?params.sender,
        token = ?params.token,
        vault_id = %params.vault_id,
        amount = %params.amount,
        "deposit indexed"
    );
    id
}
