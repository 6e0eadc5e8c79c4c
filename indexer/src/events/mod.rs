//! Event processor module for the Vaultbook indexer.
//!
//! This module provides components for processing onchain events
//! (deposits, added orders and removed orders) and mapping them into
//! stored entities.
//!
//! # Components
//!
//! - [`types`]: ChainEvent, EventPayload, ProcessingResult types
//! - [`cursor`]: EventCursor for tracking processing progress
//! - [`processor`]: EventProcessor implementation
//! - [`metrics`]: Event processor metrics

pub mod cursor;
pub mod metrics;
pub mod processor;
pub mod types;

pub use cursor::{EventCursor, EventPosition};
pub use metrics::{EventMetrics, MetricsSnapshot};
pub use processor::EventProcessor;
pub use types::{
    BlockInfo, ChainEvent, DepositParams, EvaluableConfig, EventKind, EventOutcome, EventPayload,
    EventStatus, IoConfig, OrderConfig, OrderParams, ProcessingResult, ReplaySummary,
    TransactionInfo,
};
