//! Persisted entity records.
//!
//! Every entity is written once when its triggering event is processed.
//! The only field that changes afterwards is [`Order::active`].

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an entity derived from a single log event.
///
/// Renders as `0x<tx hash>-<log index>`. Unique per (transaction hash,
/// log index), which makes it the idempotency key for redelivered events.
/// Serialized in its rendered string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EventId {
    /// Transaction hash.
    pub tx_hash: B256,
    /// Log index within the block.
    pub log_index: u64,
}

impl EventId {
    /// Creates an event id.
    #[must_use]
    pub const fn new(tx_hash: B256, log_index: u64) -> Self {
        Self { tx_hash, log_index }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}-{}", self.tx_hash, self.log_index)
    }
}

/// Error parsing an [`EventId`] from its string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid event id: {0}")]
pub struct ParseEventIdError(String);

impl FromStr for EventId {
    type Err = ParseEventIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseEventIdError(s.to_string());
        let (hash, log_index) = s.rsplit_once('-').ok_or_else(invalid)?;
        if !hash.starts_with("0x") {
            return Err(invalid());
        }
        let tx_hash = hash.parse::<B256>().map_err(|_| invalid())?;
        let log_index = log_index.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self::new(tx_hash, log_index))
    }
}

impl TryFrom<String> for EventId {
    type Error = ParseEventIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.to_string()
    }
}

/// A chain transaction that emitted at least one indexed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction hash, also the entity id.
    pub id: B256,
    /// Block number.
    pub block_number: u64,
    /// Block timestamp in seconds.
    pub timestamp: u64,
    /// Transaction sender.
    pub from: Address,
}

impl Transaction {
    /// Returns the block timestamp as a UTC datetime, if representable.
    #[must_use]
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// A deposit into a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// Entity id.
    pub id: EventId,
    /// Deposited amount.
    pub amount: U256,
    /// Depositor.
    pub sender: Address,
    /// Target vault.
    pub vault_id: U256,
    /// Deposited token.
    pub token: Address,
    /// Owning transaction hash.
    pub transaction: B256,
}

/// Expression configuration attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluable {
    /// Interpreter contract.
    pub interpreter: Address,
    /// Interpreter store contract.
    pub store: Address,
    /// Compiled expression bytecode.
    pub bytecode: Bytes,
}

/// One input or output of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Io {
    /// Token address.
    pub token: Address,
    /// Vault holding the token.
    pub vault_id: U256,
    /// Token decimals as resolved by the token metadata reader.
    pub decimals: u8,
}

/// An order, keyed by its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order hash, also the entity id.
    pub order_hash: B256,
    /// Order owner.
    pub owner: Address,
    /// Opaque nonce.
    pub nonce: Bytes,
    /// False once the order has been removed.
    pub active: bool,
    /// Timestamp of the block that added the order.
    pub timestamp_added: u64,
    /// Order expression.
    pub evaluable: Evaluable,
    /// Inputs, in emitted order.
    pub inputs: Vec<Io>,
    /// Outputs, in emitted order.
    pub outputs: Vec<Io>,
}

/// Record of an AddOrder event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrder {
    /// Entity id.
    pub id: EventId,
    /// Added order hash.
    pub order: B256,
    /// Event sender.
    pub sender: Address,
    /// Owning transaction hash.
    pub transaction: B256,
}

/// Record of a RemoveOrder event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOrder {
    /// Entity id.
    pub id: EventId,
    /// Removed order hash.
    pub order: B256,
    /// Event sender.
    pub sender: Address,
    /// Owning transaction hash.
    pub transaction: B256,
}
