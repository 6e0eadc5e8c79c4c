//! Event cursor for tracking processing progress.
//!
//! Events arrive in canonical chain order: ascending block number, then
//! ascending log index. The cursor remembers the furthest position seen so
//! redelivered ranges can be recognised.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical position of a log in the chain.
///
/// Ordered by block number first, then log index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventPosition {
    /// Block number.
    pub block_number: u64,
    /// Log index within the block.
    pub log_index: u64,
}

impl EventPosition {
    /// Creates a position.
    #[must_use]
    pub const fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl fmt::Display for EventPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}

/// Cursor for tracking event processing progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCursor {
    /// Furthest position processed, if any.
    pub last_position: Option<EventPosition>,

    /// Number of events processed.
    pub events_processed: u64,
}

impl EventCursor {
    /// Creates an empty cursor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_position: None,
            events_processed: 0,
        }
    }

    /// Creates a cursor that has already processed up to `position`.
    #[must_use]
    pub const fn at(position: EventPosition) -> Self {
        Self {
            last_position: Some(position),
            events_processed: 0,
        }
    }

    /// Returns true if the given position has been processed.
    #[must_use]
    pub fn is_processed(&self, position: EventPosition) -> bool {
        self.last_position.is_some_and(|last| position <= last)
    }

    /// Returns true if the given position lies beyond the cursor.
    #[must_use]
    pub fn should_process(&self, position: EventPosition) -> bool {
        !self.is_processed(position)
    }

    /// Marks a position as processed.
    ///
    /// Only advances if the position is beyond the current one.
    pub fn mark_processed(&mut self, position: EventPosition) {
        if self.should_process(position) {
            self.last_position = Some(position);
            self.events_processed = self.events_processed.saturating_add(1);
        }
    }

    /// Returns the last processed block, if any.
    #[must_use]
    pub fn last_block(&self) -> Option<u64> {
        self.last_position.map(|p| p.block_number)
    }

    /// Resets the cursor to initial state.
    pub fn reset(&mut self) {
        self.last_position = None;
        self.events_processed = 0;
    }
}
