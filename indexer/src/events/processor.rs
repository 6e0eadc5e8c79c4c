//! Event processor implementation.
//!
//! Dispatches chain events to their handlers one at a time, in the order
//! given, and keeps the cursor and metrics up to date.

use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use super::cursor::EventCursor;
use super::metrics::EventMetrics;
use super::types::{
    ChainEvent, EventOutcome, EventPayload, EventStatus, ProcessingResult, ReplaySummary,
};
use crate::handlers::{handle_add_order, handle_deposit, handle_remove_order, RemoveOrderOutcome};
use crate::store::EntityStore;
use crate::tokens::TokenMetadataReader;

/// Event processor mapping chain events into stored entities.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use vaultbook_indexer::events::EventProcessor;
/// use vaultbook_indexer::store::InMemoryStore;
/// use vaultbook_indexer::tokens::StaticTokenMetadata;
///
/// let store = Arc::new(InMemoryStore::new());
/// let mut processor = EventProcessor::new(store, Arc::new(StaticTokenMetadata::new(18)));
/// let events = vec![/* decoded chain events */];
///
/// let result = processor.process_batch(&events).await;
/// println!("{} deposits, {} orders added", result.deposits, result.orders_added);
/// ```
pub struct EventProcessor<S: EntityStore> {
    /// Entity store handle.
    store: Arc<S>,

    /// Token metadata collaborator.
    tokens: Arc<dyn TokenMetadataReader>,

    /// Furthest event processed.
    cursor: EventCursor,

    /// Metrics for monitoring.
    metrics: Arc<EventMetrics>,
}

impl<S: EntityStore> EventProcessor<S> {
    /// Creates a new event processor.
    #[must_use]
    pub fn new(store: Arc<S>, tokens: Arc<dyn TokenMetadataReader>) -> Self {
        Self {
            store,
            tokens,
            cursor: EventCursor::new(),
            metrics: Arc::new(EventMetrics::new()),
        }
    }

    /// Resumes from a previously saved cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: EventCursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Returns the store handle.
    #[must_use]
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Returns a reference to the metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<EventMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Returns the cursor.
    #[must_use]
    pub const fn cursor(&self) -> &EventCursor {
        &self.cursor
    }

    /// Processes a single event.
    ///
    /// Events at or before the cursor are reported as replayed and applied
    /// again; handlers key every write by event id so nothing duplicates.
    pub async fn process(&mut self, event: &ChainEvent) -> EventOutcome {
        let start = Instant::now();
        let id = event.id();
        let position = event.position();

        let replayed = self.cursor.is_processed(position);
        if replayed {
            self.metrics.record_replay();
            debug!(%id, %position, "replaying event at or before cursor");
        }

        let (status, decimals_fallbacks) = match &event.payload {
            EventPayload::Deposit(params) => {
                handle_deposit(self.store.as_ref(), event, params);
                self.metrics.record_deposit();
                (EventStatus::Applied, 0)
            }
            EventPayload::AddOrder(params) => {
                let outcome =
                    handle_add_order(self.store.as_ref(), self.tokens.as_ref(), event, params)
                        .await;
                self.metrics.record_order_added();
                self.metrics
                    .record_decimals_fallbacks(outcome.decimals_fallbacks as u64);
                (EventStatus::Applied, outcome.decimals_fallbacks)
            }
            EventPayload::RemoveOrder(params) => {
                match handle_remove_order(self.store.as_ref(), event, params) {
                    RemoveOrderOutcome::Removed { .. } => {
                        self.metrics.record_order_removed();
                        (EventStatus::Applied, 0)
                    }
                    RemoveOrderOutcome::OrderMissing => {
                        self.metrics.record_anomaly();
                        (EventStatus::OrderMissing, 0)
                    }
                }
            }
        };

        self.cursor.mark_processed(position);
        self.metrics.record_duration(start.elapsed());

        EventOutcome {
            id,
            kind: event.kind(),
            status,
            replayed,
            decimals_fallbacks,
        }
    }

    /// Processes a batch of events in order.
    pub async fn process_batch(&mut self, events: &[ChainEvent]) -> ProcessingResult {
        let mut result = ProcessingResult::empty();

        for event in events {
            let outcome = self.process(event).await;
            result.record(outcome);
        }

        debug!(
            events = result.events_processed,
            deposits = result.deposits,
            orders_added = result.orders_added,
            orders_removed = result.orders_removed,
            anomalies = result.anomalies,
            replayed = result.replayed,
            "batch processed"
        );

        result
    }

    /// Replays newline-delimited JSON events from `reader`.
    ///
    /// Lines that do not decode, invalid UTF-8 included, are logged and
    /// skipped. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading from `reader` fails.
    pub async fn process_ndjson<R>(
        &mut self,
        mut reader: R,
    ) -> crate::error::Result<ReplaySummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut summary = ReplaySummary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            summary.lines += 1;

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            match ChainEvent::decode_line(summary.lines, line) {
                Ok(event) => {
                    let outcome = self.process(&event).await;
                    summary.result.record(outcome);
                }
                Err(err) => {
                    summary.rejected += 1;
                    warn!(%err, "skipping event");
                }
            }
        }

        debug!(
            lines = summary.lines,
            events = summary.result.events_processed,
            rejected = summary.rejected,
            "event source drained"
        );

        Ok(summary)
    }

    /// Resets the cursor.
    pub fn reset_cursor(&mut self) {
        self.cursor.reset();
    }
}
