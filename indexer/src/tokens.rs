//! Token metadata lookups.
//!
//! Orders record the ERC-20 decimals of each input and output token. The
//! value comes from a [`TokenMetadataReader`]; a failed lookup never aborts
//! indexing, the reader's fallback is used instead.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use dashmap::DashMap;

/// Token metadata lookup errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenMetadataError {
    /// Token has no known metadata.
    #[error("unknown token: {0}")]
    Unknown(Address),

    /// Token contract did not answer as an ERC-20.
    #[error("token {token} is not a compliant erc20: {reason}")]
    NonCompliant {
        /// Token address.
        token: Address,
        /// Failure description.
        reason: String,
    },

    /// Metadata source could not be read.
    #[error("metadata source unavailable: {0}")]
    Unavailable(String),
}

/// Reads ERC-20 metadata for a token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenMetadataReader: Send + Sync {
    /// Returns the token's decimals.
    async fn decimals(&self, token: Address) -> Result<u8, TokenMetadataError>;

    /// Decimals to use when [`Self::decimals`] fails.
    fn fallback_decimals(&self) -> u8;
}

/// Decimals resolved for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDecimals {
    /// Decimals to record.
    pub decimals: u8,
    /// True if the lookup failed and the fallback was used.
    pub fell_back: bool,
}

/// Looks up decimals for `token`, substituting the reader's fallback on
/// failure.
pub async fn resolve_decimals(reader: &dyn TokenMetadataReader, token: Address) -> ResolvedDecimals {
    match reader.decimals(token).await {
        Ok(decimals) => ResolvedDecimals {
            decimals,
            fell_back: false,
        },
        Err(err) => {
            let decimals = reader.fallback_decimals();
            tracing::warn!(%err, token = ?token, decimals, "decimals lookup failed, using fallback");
            ResolvedDecimals {
                decimals,
                fell_back: true,
            }
        }
    }
}

/// Resolves decimals for every token, preserving order.
pub async fn resolve_all_decimals(
    reader: &dyn TokenMetadataReader,
    tokens: &[Address],
) -> Vec<ResolvedDecimals> {
    futures::future::join_all(tokens.iter().map(|token| resolve_decimals(reader, *token))).await
}

/// Fixed table of token decimals.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenMetadata {
    decimals: HashMap<Address, u8>,
    fallback: u8,
}

impl StaticTokenMetadata {
    /// Creates an empty table with the given fallback.
    #[must_use]
    pub fn new(fallback: u8) -> Self {
        Self {
            decimals: HashMap::new(),
            fallback,
        }
    }

    /// Adds a token.
    #[must_use]
    pub fn with_token(mut self, token: Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    /// Parses a JSON object mapping token addresses to decimals.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not such an object.
    pub fn from_json(json: &str, fallback: u8) -> Result<Self, TokenMetadataError> {
        let decimals: HashMap<Address, u8> = serde_json::from_str(json)
            .map_err(|e| TokenMetadataError::Unavailable(e.to_string()))?;
        Ok(Self { decimals, fallback })
    }

    /// Loads a JSON token table from disk.
    ///
    /// # Errors
    ///
    /// Returns an io error if the file cannot be read and a token metadata
    /// error if it cannot be parsed.
    pub async fn load(path: &Path, fallback: u8) -> crate::error::Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_json(&json, fallback)?)
    }

    /// Returns the number of known tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decimals.len()
    }

    /// Returns true if no tokens are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decimals.is_empty()
    }
}

#[async_trait]
impl TokenMetadataReader for StaticTokenMetadata {
    async fn decimals(&self, token: Address) -> Result<u8, TokenMetadataError> {
        self.decimals
            .get(&token)
            .copied()
            .ok_or(TokenMetadataError::Unknown(token))
    }

    fn fallback_decimals(&self) -> u8 {
        self.fallback
    }
}

/// Memoises successful lookups of an inner reader.
///
/// Failures are not cached, so a token that was unreachable once is asked
/// again on its next appearance.
pub struct CachedTokenMetadata {
    inner: Arc<dyn TokenMetadataReader>,
    cache: DashMap<Address, u8>,
}

impl std::fmt::Debug for CachedTokenMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedTokenMetadata")
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

impl CachedTokenMetadata {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn TokenMetadataReader>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Returns the number of memoised tokens.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl TokenMetadataReader for CachedTokenMetadata {
    async fn decimals(&self, token: Address) -> Result<u8, TokenMetadataError> {
        if let Some(decimals) = self.cache.get(&token) {
            return Ok(*decimals);
        }

        let decimals = self.inner.decimals(token).await?;
        self.cache.insert(token, decimals);
        Ok(decimals)
    }

    fn fallback_decimals(&self) -> u8 {
        self.inner.fallback_decimals()
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::error::IndexerError;

    #[tokio::test]
    async fn test_static_known_token() {
        let token = Address::repeat_byte(1);
        let reader = StaticTokenMetadata::new(18).with_token(token, 6);

        assert_eq!(reader.decimals(token).await.ok(), Some(6));
        assert_eq!(reader.len(), 1);
    }

    #[tokio::test]
    async fn test_static_unknown_token() {
        let reader = StaticTokenMetadata::new(18);
        let result = reader.decimals(Address::repeat_byte(2)).await;
        assert!(matches!(result, Err(TokenMetadataError::Unknown(_))));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_static_from_json() {
        let json = format!(r#"{{"0x{}": 8, "0x{}": 18}}"#, "aa".repeat(20), "bb".repeat(20));
        let reader = StaticTokenMetadata::from_json(&json, 0).expect("table");

        assert_eq!(reader.len(), 2);
        let decimals = tokio_test::block_on(reader.decimals(Address::repeat_byte(0xaa)));
        assert_eq!(decimals.ok(), Some(8));
    }

    #[test]
    fn test_static_from_json_invalid() {
        let result = StaticTokenMetadata::from_json("[1, 2]", 18);
        assert!(matches!(result, Err(TokenMetadataError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_static_load() {
        let path =
            std::env::temp_dir().join(format!("vaultbook-tokens-{}.json", std::process::id()));
        let json = format!(r#"{{"0x{}": 6}}"#, "cc".repeat(20));
        tokio::fs::write(&path, json).await.expect("write");

        let reader = StaticTokenMetadata::load(&path, 18).await;
        let _ = tokio::fs::remove_file(&path).await;

        let reader = reader.expect("table");
        assert_eq!(reader.decimals(Address::repeat_byte(0xcc)).await.ok(), Some(6));
        assert_eq!(reader.fallback_decimals(), 18);
    }

    #[tokio::test]
    async fn test_static_load_missing_file() {
        let path = std::env::temp_dir().join("vaultbook-no-such-tokens.json");
        let result = StaticTokenMetadata::load(&path, 18).await;
        assert!(matches!(result, Err(IndexerError::Io(_))));
    }

    #[tokio::test]
    async fn test_static_load_invalid_table() {
        let path = std::env::temp_dir()
            .join(format!("vaultbook-bad-tokens-{}.json", std::process::id()));
        tokio::fs::write(&path, "[1, 2]").await.expect("write");

        let result = StaticTokenMetadata::load(&path, 18).await;
        let _ = tokio::fs::remove_file(&path).await;

        assert!(matches!(
            result,
            Err(IndexerError::TokenMetadata(TokenMetadataError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_resolve_decimals_success() {
        let mut reader = MockTokenMetadataReader::new();
        reader.expect_decimals().returning(|_| Ok(6));
        reader.expect_fallback_decimals().never();

        let resolved = resolve_decimals(&reader, Address::repeat_byte(1)).await;
        assert_eq!(
            resolved,
            ResolvedDecimals {
                decimals: 6,
                fell_back: false
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_decimals_fallback() {
        let mut reader = MockTokenMetadataReader::new();
        reader.expect_decimals().returning(|token| {
            Err(TokenMetadataError::NonCompliant {
                token,
                reason: "execution reverted".to_string(),
            })
        });
        reader.expect_fallback_decimals().return_const(18u8);

        let resolved = resolve_decimals(&reader, Address::repeat_byte(1)).await;
        assert_eq!(
            resolved,
            ResolvedDecimals {
                decimals: 18,
                fell_back: true
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_all_decimals_preserves_order() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let reader = StaticTokenMetadata::new(0).with_token(a, 6).with_token(b, 8);

        let resolved = resolve_all_decimals(&reader, &[b, a, b]).await;
        let decimals: Vec<u8> = resolved.iter().map(|r| r.decimals).collect();
        assert_eq!(decimals, vec![8, 6, 8]);
    }

    #[tokio::test]
    async fn test_cached_memoises_success() {
        let token = Address::repeat_byte(3);
        let mut inner = MockTokenMetadataReader::new();
        inner
            .expect_decimals()
            .with(eq(token))
            .times(1)
            .returning(|_| Ok(12));

        let cached = CachedTokenMetadata::new(Arc::new(inner));
        assert_eq!(cached.decimals(token).await.ok(), Some(12));
        assert_eq!(cached.decimals(token).await.ok(), Some(12));
        assert_eq!(cached.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_cached_does_not_memoise_failure() {
        let token = Address::repeat_byte(4);
        let mut inner = MockTokenMetadataReader::new();
        inner
            .expect_decimals()
            .times(2)
            .returning(|_| Err(TokenMetadataError::Unavailable("rpc down".to_string())));
        inner.expect_fallback_decimals().return_const(18u8);

        let cached = CachedTokenMetadata::new(Arc::new(inner));
        assert!(cached.decimals(token).await.is_err());
        assert!(cached.decimals(token).await.is_err());
        assert_eq!(cached.cached_len(), 0);
        assert_eq!(cached.fallback_decimals(), 18);
    }
}
