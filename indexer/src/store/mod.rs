//! Entity store.
//!
//! Handlers receive the store as an explicit handle implementing
//! [`EntityStore`]. Saves are upserts keyed by entity id; nothing is ever
//! deleted.

mod memory;

pub use memory::{InMemoryStore, StoreSnapshot};

use alloy_primitives::B256;
use serde::Serialize;

use crate::entities::{AddOrder, Deposit, EventId, Order, RemoveOrder, Transaction};

/// Number of stored entities per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    /// Transactions.
    pub transactions: usize,
    /// Deposits.
    pub deposits: usize,
    /// Orders.
    pub orders: usize,
    /// AddOrder records.
    pub add_orders: usize,
    /// RemoveOrder records.
    pub remove_orders: usize,
}

/// Keyed entity storage used by the handlers.
pub trait EntityStore: Send + Sync {
    /// Loads a transaction by hash.
    fn transaction(&self, hash: &B256) -> Option<Transaction>;

    /// Saves a transaction.
    fn save_transaction(&self, transaction: Transaction);

    /// Loads a deposit by id.
    fn deposit(&self, id: &EventId) -> Option<Deposit>;

    /// Saves a deposit.
    fn save_deposit(&self, deposit: Deposit);

    /// Loads an order by hash.
    fn order(&self, order_hash: &B256) -> Option<Order>;

    /// Saves an order.
    fn save_order(&self, order: Order);

    /// Loads an AddOrder record by id.
    fn add_order(&self, id: &EventId) -> Option<AddOrder>;

    /// Saves an AddOrder record.
    fn save_add_order(&self, add_order: AddOrder);

    /// Loads a RemoveOrder record by id.
    fn remove_order(&self, id: &EventId) -> Option<RemoveOrder>;

    /// Saves a RemoveOrder record.
    fn save_remove_order(&self, remove_order: RemoveOrder);

    /// Returns the number of stored entities per type.
    fn counts(&self) -> EntityCounts;
}
