//! Indexer error types.
//!
//! Mapping itself never fails: anomalies are logged and skipped inside the
//! handlers. These errors cover everything around it (configuration, event
//! decoding, token metadata files and snapshot output).

use crate::config::ConfigError;
use crate::tokens::TokenMetadataError;

/// Indexer errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A chain event could not be decoded.
    #[error("event decode error at line {line}: {message}")]
    EventDecode {
        /// 1-based line number in the event source.
        line: usize,
        /// Decoder message.
        message: String,
    },

    /// Token metadata could not be loaded.
    #[error("token metadata error: {0}")]
    TokenMetadata(#[from] TokenMetadataError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, IndexerError>;
