//! Vaultbook Indexer - maps order book chain events into queryable entities.
//!
//! Consumes Deposit, AddOrder and RemoveOrder events emitted by the
//! order book contract and persists Transaction, Deposit, Order, AddOrder
//! and RemoveOrder entities through an injected store handle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────┐
//! │ Chain events │────▶│ EventProcessor │────▶│   Handlers   │
//! │  (NDJSON)    │     │ cursor/metrics │     │ per kind     │
//! └──────────────┘     └────────────────┘     └──────┬───────┘
//!                                                    │
//!                       ┌────────────────┐    ┌──────▼───────┐
//!                       │ TokenMetadata  │◀───│ EntityStore  │
//!                       │ (decimals)     │    │ (DashMap)    │
//!                       └────────────────┘    └──────────────┘
//! ```
//!
//! Every entity derived from an event is keyed by its [`entities::EventId`],
//! so replaying a block range rewrites the same records.
//!
//! # Components
//!
//! - [`entities`]: Entity records
//! - [`events`]: Event types, processor, cursor and metrics
//! - [`handlers`]: Per-event mapping logic
//! - [`store`]: Entity store trait and in-memory implementation
//! - [`tokens`]: Token decimals lookups
//! - [`config`]: Indexer configuration
//! - [`error`]: Error types

#![cfg_attr(test, allow(missing_docs))]

pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod handlers;
pub mod store;
pub mod tokens;

pub use config::{ConfigError, IndexerConfig};
pub use entities::{
    AddOrder, Deposit, EventId, Order, ParseEventIdError, RemoveOrder, Transaction,
};
pub use error::{IndexerError, Result};
pub use events::{ChainEvent, EventProcessor, ProcessingResult, ReplaySummary};
pub use store::{EntityStore, InMemoryStore, StoreSnapshot};
pub use tokens::{CachedTokenMetadata, StaticTokenMetadata, TokenMetadataReader};
