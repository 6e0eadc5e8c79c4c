//! AddOrder and RemoveOrder event mapping.
//!
//! Orders are keyed by their hash. The only mutation after creation is
//! deactivation on removal.

use crate::entities::{AddOrder, Evaluable, EventId, Io, Order, RemoveOrder};
use crate::events::{ChainEvent, IoConfig, OrderParams};
use crate::store::EntityStore;
use crate::tokens::{resolve_all_decimals, TokenMetadataReader};

use super::transaction::create_transaction_entity;

/// Result of [`handle_add_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOrderOutcome {
    /// Id of the AddOrder record.
    pub id: EventId,
    /// False if the order was already stored and left untouched.
    pub order_created: bool,
    /// Number of IO entries whose decimals fell back.
    pub decimals_fallbacks: usize,
}

/// Result of [`handle_remove_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOrderOutcome {
    /// The order was deactivated and a RemoveOrder record written.
    Removed {
        /// Id of the RemoveOrder record.
        id: EventId,
        /// Whether the order was active before this event.
        was_active: bool,
    },
    /// No order with the given hash exists; nothing was written.
    OrderMissing,
}

/// Records an added order.
///
/// The order is created active with the decimals of every IO resolved
/// through `tokens`. An order that is already stored is never rewritten,
/// so a redelivered AddOrder cannot reactivate a removed order. Exactly one
/// AddOrder record is kept per event.
pub async fn handle_add_order<S>(
    store: &S,
    tokens: &dyn TokenMetadataReader,
    event: &ChainEvent,
    params: &OrderParams,
) -> AddOrderOutcome
where
    S: EntityStore + ?Sized,
{
    let id = event.id();
    let transaction = create_transaction_entity(store, event);

    let mut order_created = false;
    let mut decimals_fallbacks = 0;

    if store.order(&params.order_hash).is_none() {
        let config = &params.order;
        let (inputs, input_fallbacks) = build_ios(tokens, &config.valid_inputs).await;
        let (outputs, output_fallbacks) = build_ios(tokens, &config.valid_outputs).await;
        decimals_fallbacks = input_fallbacks + output_fallbacks;

        store.save_order(Order {
            order_hash: params.order_hash,
            owner: config.owner,
            nonce: config.nonce.clone(),
            active: true,
            timestamp_added: event.block.timestamp,
            evaluable: Evaluable {
                interpreter: config.evaluable.interpreter,
                store: config.evaluable.store,
                bytecode: config.evaluable.bytecode.clone(),
            },
            inputs,
            outputs,
        });
        order_created = true;
    } else {
        tracing::debug!(order = %params.order_hash, "order already indexed");
    }

    store.save_add_order(AddOrder {
        id,
        order: params.order_hash,
        sender: params.sender,
        transaction,
    });

    tracing::debug!(
        %id,
        order = %params.order_hash,
        owner = ?params.order.owner,
        inputs = params.order.valid_inputs.len(),
        outputs = params.order.valid_outputs.len(),
        order_created,
        "order added"
    );

    AddOrderOutcome {
        id,
        order_created,
        decimals_fallbacks,
    }
}

/// Records a removed order.
///
/// The referenced order must already be stored. If it is not, the event is
/// logged as a data anomaly and skipped without writing anything.
pub fn handle_remove_order<S>(
    store: &S,
    event: &ChainEvent,
    params: &OrderParams,
) -> RemoveOrderOutcome
where
    S: EntityStore + ?Sized,
{
    let id = event.id();

    let Some(mut order) = store.order(&params.order_hash) else {
        tracing::warn!(
            %id,
            order = %params.order_hash,
            "remove for unknown order, skipping"
        );
        return RemoveOrderOutcome::OrderMissing;
    };

    let transaction = create_transaction_entity(store, event);

    let was_active = order.active;
    if was_active {
        order.active = false;
        store.save_order(order);
    }

    store.save_remove_order(RemoveOrder {
        id,
        order: params.order_hash,
        sender: params.sender,
        transaction,
    });

    tracing::debug!(%id, order = %params.order_hash, was_active, "order removed");

    RemoveOrderOutcome::Removed { id, was_active }
}

/// Builds IO records in emitted order, returning how many fell back.
async fn build_ios(tokens: &dyn TokenMetadataReader, configs: &[IoConfig]) -> (Vec<Io>, usize) {
    let addresses: Vec<_> = configs.iter().map(|io| io.token).collect();
    let resolved = resolve_all_decimals(tokens, &addresses).await;

    let fallbacks = resolved.iter().filter(|r| r.fell_back).count();
    let ios = configs
        .iter()
        .zip(resolved)
        .map(|(io, resolved)| Io {
            token: io.token,
            vault_id: io.vault_id,
            decimals: resolved.decimals,
        })
        .collect();

    (ios, fallbacks)
}
