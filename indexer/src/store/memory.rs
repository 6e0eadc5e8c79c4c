//! In-memory entity store backed by `DashMap`.

use std::path::Path;

use alloy_primitives::{Address, B256, U256};
use dashmap::DashMap;
use serde::Serialize;

use super::{EntityCounts, EntityStore};
use crate::entities::{AddOrder, Deposit, EventId, Order, RemoveOrder, Transaction};
use crate::error::Result;

/// Thread-safe in-memory entity store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    transactions: DashMap<B256, Transaction>,
    deposits: DashMap<EventId, Deposit>,
    orders: DashMap<B256, Order>,
    add_orders: DashMap<EventId, AddOrder>,
    remove_orders: DashMap<EventId, RemoveOrder>,
}

/// Serializable copy of the whole store, each list sorted by id.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Transactions.
    pub transactions: Vec<Transaction>,
    /// Deposits.
    pub deposits: Vec<Deposit>,
    /// Orders.
    pub orders: Vec<Order>,
    /// AddOrder records.
    pub add_orders: Vec<AddOrder>,
    /// RemoveOrder records.
    pub remove_orders: Vec<RemoveOrder>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all orders owned by `owner`, sorted by order hash.
    pub fn orders_by_owner(&self, owner: &Address) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.owner == *owner)
            .map(|o| o.clone())
            .collect();
        orders.sort_by_key(|o| o.order_hash);
        orders
    }

    /// Returns all active orders, sorted by order hash.
    pub fn active_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.active)
            .map(|o| o.clone())
            .collect();
        orders.sort_by_key(|o| o.order_hash);
        orders
    }

    /// Returns deposits into the given token vault, sorted by id.
    pub fn deposits_for_vault(&self, token: &Address, vault_id: U256) -> Vec<Deposit> {
        let mut deposits: Vec<Deposit> = self
            .deposits
            .iter()
            .filter(|d| d.token == *token && d.vault_id == vault_id)
            .map(|d| d.clone())
            .collect();
        deposits.sort_by_key(|d| d.id);
        deposits
    }

    /// Returns a sorted copy of every stored entity.
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot {
            transactions: self.transactions.iter().map(|e| e.clone()).collect(),
            deposits: self.deposits.iter().map(|e| e.clone()).collect(),
            orders: self.orders.iter().map(|e| e.clone()).collect(),
            add_orders: self.add_orders.iter().map(|e| e.clone()).collect(),
            remove_orders: self.remove_orders.iter().map(|e| e.clone()).collect(),
        };
        snapshot.transactions.sort_by_key(|t| t.id);
        snapshot.deposits.sort_by_key(|d| d.id);
        snapshot.orders.sort_by_key(|o| o.order_hash);
        snapshot.add_orders.sort_by_key(|a| a.id);
        snapshot.remove_orders.sort_by_key(|r| r.id);
        snapshot
    }

    /// Renders [`Self::snapshot`] as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Writes the JSON snapshot to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn write_snapshot(&self, path: &Path) -> Result<()> {
        let json = self.snapshot_json()?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Removes every entity.
    pub fn clear(&self) {
        self.transactions.clear();
        self.deposits.clear();
        self.orders.clear();
        self.add_orders.clear();
        self.remove_orders.clear();
    }
}

impl EntityStore for InMemoryStore {
    fn transaction(&self, hash: &B256) -> Option<Transaction> {
        self.transactions.get(hash).map(|t| t.clone())
    }

    fn save_transaction(&self, transaction: Transaction) {
        self.transactions.insert(transaction.id, transaction);
    }

    fn deposit(&self, id: &EventId) -> Option<Deposit> {
        self.deposits.get(id).map(|d| d.clone())
    }

    fn save_deposit(&self, deposit: Deposit) {
        self.deposits.insert(deposit.id, deposit);
    }

    fn order(&self, order_hash: &B256) -> Option<Order> {
        self.orders.get(order_hash).map(|o| o.clone())
    }

    fn save_order(&self, order: Order) {
        self.orders.insert(order.order_hash, order);
    }

    fn add_order(&self, id: &EventId) -> Option<AddOrder> {
        self.add_orders.get(id).map(|a| a.clone())
    }

    fn save_add_order(&self, add_order: AddOrder) {
        self.add_orders.insert(add_order.id, add_order);
    }

    fn remove_order(&self, id: &EventId) -> Option<RemoveOrder> {
        self.remove_orders.get(id).map(|r| r.clone())
    }

    fn save_remove_order(&self, remove_order: RemoveOrder) {
        self.remove_orders.insert(remove_order.id, remove_order);
    }

    fn counts(&self) -> EntityCounts {
        EntityCounts {
            transactions: self.transactions.len(),
            deposits: self.deposits.len(),
            orders: self.orders.len(),
            add_orders: self.add_orders.len(),
            remove_orders: self.remove_orders.len(),
        }
    }
}
