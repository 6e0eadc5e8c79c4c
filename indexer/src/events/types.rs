//! Types for the event processor.
//!
//! Defines the inbound chain event envelope, its kind-specific payloads,
//! and the per-event and per-batch processing results.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use super::cursor::EventPosition;
use crate::entities::EventId;
use crate::error::{IndexerError, Result};

/// Kind of chain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Vault deposit.
    Deposit,
    /// Order added.
    AddOrder,
    /// Order removed.
    RemoveOrder,
}

impl EventKind {
    /// Returns a human-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::AddOrder => "add_order",
            Self::RemoveOrder => "remove_order",
        }
    }
}

/// Transaction that emitted the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// Transaction hash.
    pub hash: B256,
    /// Transaction sender.
    pub from: Address,
}

/// Block that included the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block number.
    pub number: u64,
    /// Block timestamp in seconds.
    pub timestamp: u64,
}

/// A chain log event as delivered by the event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEvent {
    /// Emitting transaction.
    pub transaction: TransactionInfo,
    /// Log index within the block.
    pub log_index: u64,
    /// Including block.
    pub block: BlockInfo,
    /// Kind-specific parameters.
    pub payload: EventPayload,
}

impl ChainEvent {
    /// Returns the id of entities derived from this event.
    #[must_use]
    pub const fn id(&self) -> EventId {
        EventId::new(self.transaction.hash, self.log_index)
    }

    /// Returns the canonical position of this event in the chain.
    #[must_use]
    pub const fn position(&self) -> EventPosition {
        EventPosition::new(self.block.number, self.log_index)
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Decodes one NDJSON line. `line` is 1-based and only used for errors.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::EventDecode`] if the line is not valid UTF-8
    /// JSON describing an event.
    pub fn decode_line(line: usize, json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json).map_err(|e| IndexerError::EventDecode {
            line,
            message: e.to_string(),
        })
    }
}

/// Kind-specific event parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventPayload {
    /// Deposit parameters.
    Deposit(DepositParams),
    /// AddOrder parameters.
    AddOrder(OrderParams),
    /// RemoveOrder parameters.
    RemoveOrder(OrderParams),
}

impl EventPayload {
    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Deposit(_) => EventKind::Deposit,
            Self::AddOrder(_) => EventKind::AddOrder,
            Self::RemoveOrder(_) => EventKind::RemoveOrder,
        }
    }
}

/// Parameters of a Deposit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositParams {
    /// Depositor.
    pub sender: Address,
    /// Target vault.
    pub vault_id: U256,
    /// Deposited token.
    pub token: Address,
    /// Deposited amount.
    pub amount: U256,
}

/// Parameters of an AddOrder or RemoveOrder event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParams {
    /// Event sender.
    pub sender: Address,
    /// Hash of the order, computed by the emitting contract.
    pub order_hash: B256,
    /// The order itself.
    pub order: OrderConfig,
}

/// Order as emitted onchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfig {
    /// Order owner.
    pub owner: Address,
    /// Opaque nonce, any length.
    pub nonce: Bytes,
    /// Order expression.
    pub evaluable: EvaluableConfig,
    /// Inputs, index-significant.
    pub valid_inputs: Vec<IoConfig>,
    /// Outputs, index-significant.
    pub valid_outputs: Vec<IoConfig>,
}

/// Expression configuration as emitted onchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluableConfig {
    /// Interpreter contract.
    pub interpreter: Address,
    /// Interpreter store contract.
    pub store: Address,
    /// Compiled expression bytecode.
    pub bytecode: Bytes,
}

/// Input or output entry as emitted onchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoConfig {
    /// Token address.
    pub token: Address,
    /// Decimals declared by the order author.
    pub decimals: u8,
    /// Vault holding the token.
    pub vault_id: U256,
}

/// How a single event was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Entities were written.
    Applied,
    /// RemoveOrder referenced an order that is not in the store.
    OrderMissing,
}

/// Result of processing a single event.
#[derive(Debug, Clone)]
pub struct EventOutcome {
    /// Id of the event.
    pub id: EventId,
    /// Kind of the event.
    pub kind: EventKind,
    /// Application status.
    pub status: EventStatus,
    /// True if the event sat at or before the cursor.
    pub replayed: bool,
    /// Decimals lookups that fell back (AddOrder only).
    pub decimals_fallbacks: usize,
}

impl EventOutcome {
    /// Returns true if the event was a data anomaly.
    #[must_use]
    pub const fn is_anomaly(&self) -> bool {
        matches!(self.status, EventStatus::OrderMissing)
    }
}

/// Result of processing events.
#[derive(Debug, Clone, Default)]
pub struct ProcessingResult {
    /// Number of events processed.
    pub events_processed: usize,
    /// Number of deposits.
    pub deposits: usize,
    /// Number of AddOrder events.
    pub orders_added: usize,
    /// Number of RemoveOrder events that found their order.
    pub orders_removed: usize,
    /// Number of events skipped as data anomalies.
    pub anomalies: usize,
    /// Number of events at or before the cursor.
    pub replayed: usize,
    /// Number of decimals lookups that fell back.
    pub decimals_fallbacks: usize,
    /// Per-event outcomes, in processing order.
    pub outcomes: Vec<EventOutcome>,
}

impl ProcessingResult {
    /// Creates an empty result.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no events were processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events_processed == 0
    }

    /// Folds a single event outcome into the totals.
    pub fn record(&mut self, outcome: EventOutcome) {
        self.events_processed += 1;
        match (outcome.kind, outcome.status) {
            (_, EventStatus::OrderMissing) => self.anomalies += 1,
            (EventKind::Deposit, EventStatus::Applied) => self.deposits += 1,
            (EventKind::AddOrder, EventStatus::Applied) => self.orders_added += 1,
            (EventKind::RemoveOrder, EventStatus::Applied) => self.orders_removed += 1,
        }
        if outcome.replayed {
            self.replayed += 1;
        }
        self.decimals_fallbacks += outcome.decimals_fallbacks;
        self.outcomes.push(outcome);
    }
}

/// Result of replaying an NDJSON event source.
#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    /// Totals for the events that decoded.
    pub result: ProcessingResult,
    /// Number of lines read, blank lines included.
    pub lines: usize,
    /// Number of lines skipped because they did not decode.
    pub rejected: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit_json() -> String {
        format!(
            r#"{{
                "transaction": {{"hash": "0x{hash}", "from": "0x{from}"}},
                "logIndex": 2,
                "block": {{"number": 10, "timestamp": 1700000000}},
                "payload": {{
                    "kind": "deposit",
                    "sender": "0x{from}",
                    "vaultId": "0x1",
                    "token": "0x{token}",
                    "amount": "0x64"
                }}
            }}"#,
            hash = "11".repeat(32),
            from = "22".repeat(20),
            token = "33".repeat(20),
        )
    }

    fn order_json(kind: &str, nonce: &str) -> String {
        format!(
            r#"{{"transaction":{{"hash":"0x{hash}","from":"0x{owner}"}},"logIndex":5,"block":{{"number":11,"timestamp":1700000012}},"payload":{{"kind":"{kind}","sender":"0x{owner}","orderHash":"0x{order}","order":{{"owner":"0x{owner}","nonce":"{nonce}","evaluable":{{"interpreter":"0x{interpreter}","store":"0x{store}","bytecode":"0xdeadbeef"}},"validInputs":[{{"token":"0x{first}","decimals":6,"vaultId":"0x1"}},{{"token":"0x{second}","decimals":18,"vaultId":"0x2"}}],"validOutputs":[{{"token":"0x{second}","decimals":18,"vaultId":"0x3"}}]}}}}}}"#,
            hash = "44".repeat(32),
            owner = "aa".repeat(20),
            order = "bb".repeat(32),
            interpreter = "01".repeat(20),
            store = "02".repeat(20),
            first = "cc".repeat(20),
            second = "dd".repeat(20),
        )
    }

    #[test]
    fn test_decode_line() {
        let event = ChainEvent::decode_line(1, deposit_json().as_bytes()).expect("event");
        assert_eq!(event.kind(), EventKind::Deposit);
        assert_eq!(event.position(), EventPosition::new(10, 2));
    }

    #[test]
    fn test_decode_line_unknown_kind() {
        let json = deposit_json().replace(r#""kind": "deposit""#, r#""kind": "withdraw""#);
        let result = ChainEvent::decode_line(4, json.as_bytes());
        assert!(matches!(result, Err(IndexerError::EventDecode { line: 4, .. })));
    }

    #[test]
    fn test_decode_line_malformed() {
        let result = ChainEvent::decode_line(9, b"{not json");
        assert!(matches!(result, Err(IndexerError::EventDecode { line: 9, .. })));
    }

    #[test]
    fn test_decode_line_invalid_utf8() {
        let result = ChainEvent::decode_line(2, b"\xff\xfe");
        assert!(matches!(result, Err(IndexerError::EventDecode { line: 2, .. })));
    }

    #[test]
    fn test_decode_add_order_event() {
        let json = order_json("addOrder", "0x1234");
        let event = ChainEvent::decode_line(1, json.as_bytes()).expect("event");

        assert_eq!(event.kind(), EventKind::AddOrder);
        assert_eq!(event.id(), EventId::new(B256::repeat_byte(0x44), 5));

        let EventPayload::AddOrder(params) = event.payload else {
            unreachable!("decoded an addOrder payload");
        };
        assert_eq!(params.sender, Address::repeat_byte(0xaa));
        assert_eq!(params.order_hash, B256::repeat_byte(0xbb));

        let order = params.order;
        assert_eq!(order.owner, Address::repeat_byte(0xaa));
        assert_eq!(order.nonce, Bytes::from(vec![0x12, 0x34]));
        assert_eq!(order.evaluable.interpreter, Address::repeat_byte(0x01));
        assert_eq!(order.evaluable.store, Address::repeat_byte(0x02));
        assert_eq!(order.evaluable.bytecode, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));

        let inputs: Vec<(Address, U256)> = order
            .valid_inputs
            .iter()
            .map(|io| (io.token, io.vault_id))
            .collect();
        assert_eq!(
            inputs,
            vec![
                (Address::repeat_byte(0xcc), U256::from(1)),
                (Address::repeat_byte(0xdd), U256::from(2)),
            ]
        );
        assert_eq!(order.valid_inputs[0].decimals, 6);
        assert_eq!(order.valid_outputs.len(), 1);
        assert_eq!(order.valid_outputs[0].token, Address::repeat_byte(0xdd));
        assert_eq!(order.valid_outputs[0].vault_id, U256::from(3));
    }

    #[test]
    fn test_decode_remove_order_event() {
        let json = order_json("removeOrder", "0x");
        let event = ChainEvent::decode_line(1, json.as_bytes()).expect("event");

        assert_eq!(event.kind(), EventKind::RemoveOrder);
        let EventPayload::RemoveOrder(params) = event.payload else {
            unreachable!("decoded a removeOrder payload");
        };
        assert_eq!(params.order_hash, B256::repeat_byte(0xbb));
        assert!(params.order.nonce.is_empty());
        assert_eq!(params.order.valid_inputs.len(), 2);
    }

    #[test]
    fn test_decode_nonce_any_length() {
        let long = format!("0x{}", "ef".repeat(40));
        for nonce in ["0x01", "0x1234", long.as_str()] {
            let json = order_json("addOrder", nonce);
            assert!(ChainEvent::decode_line(1, json.as_bytes()).is_ok(), "{nonce}");
        }
    }

    #[test]
    fn test_event_kind_as_str() {
        assert_eq!(EventKind::Deposit.as_str(), "deposit");
        assert_eq!(EventKind::AddOrder.as_str(), "add_order");
        assert_eq!(EventKind::RemoveOrder.as_str(), "remove_order");
    }

    #[test]
    fn test_decode_deposit_event() {
        let event: ChainEvent = serde_json::from_str(&deposit_json()).expect("decode");

        assert_eq!(event.kind(), EventKind::Deposit);
        assert_eq!(event.log_index, 2);
        assert_eq!(event.block.number, 10);
        assert_eq!(event.id(), EventId::new(B256::repeat_byte(0x11), 2));
        assert_eq!(event.position(), EventPosition::new(10, 2));

        let EventPayload::Deposit(params) = event.payload else {
            unreachable!("decoded a deposit payload");
        };
        assert_eq!(params.amount, U256::from(100));
        assert_eq!(params.vault_id, U256::from(1));
        assert_eq!(params.token, Address::repeat_byte(0x33));
    }

    #[test]
    fn test_processing_result_empty() {
        let result = ProcessingResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.events_processed, 0);
        assert_eq!(result.deposits, 0);
        assert_eq!(result.anomalies, 0);
    }

    #[test]
    fn test_processing_result_record() {
        let mut result = ProcessingResult::empty();
        let id = EventId::new(B256::ZERO, 0);

        result.record(EventOutcome {
            id,
            kind: EventKind::AddOrder,
            status: EventStatus::Applied,
            replayed: false,
            decimals_fallbacks: 2,
        });
        result.record(EventOutcome {
            id,
            kind: EventKind::RemoveOrder,
            status: EventStatus::OrderMissing,
            replayed: true,
            decimals_fallbacks: 0,
        });

        assert_eq!(result.events_processed, 2);
        assert_eq!(result.orders_added, 1);
        assert_eq!(result.orders_removed, 0);
        assert_eq!(result.anomalies, 1);
        assert_eq!(result.replayed, 1);
        assert_eq!(result.decimals_fallbacks, 2);
        assert!(result.outcomes[1].is_anomaly());
    }
}
