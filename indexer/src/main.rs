//! Vaultbook Indexer binary.
//!
//! Replays a newline-delimited JSON file of chain events through the
//! mapper and writes the resulting entities as a JSON snapshot.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vaultbook_indexer::{
    CachedTokenMetadata, EntityStore, EventProcessor, InMemoryStore, IndexerConfig,
    StaticTokenMetadata, TokenMetadataReader,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vaultbook_indexer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = IndexerConfig::from_env().context("invalid configuration")?;
    let events_path = config.events_source()?;

    tracing::info!("Starting Vaultbook Indexer");
    tracing::info!("Events: {}", events_path.display());
    tracing::info!(
        fallback_decimals = config.fallback_decimals,
        token_cache = config.token_cache_enabled,
        "token metadata settings"
    );

    let table = match &config.token_metadata_path {
        Some(path) => {
            let table = StaticTokenMetadata::load(path, config.fallback_decimals).await?;
            tracing::info!(tokens = table.len(), "loaded token metadata");
            table
        }
        None => StaticTokenMetadata::new(config.fallback_decimals),
    };
    let tokens: Arc<dyn TokenMetadataReader> = if config.token_cache_enabled {
        Arc::new(CachedTokenMetadata::new(Arc::new(table)))
    } else {
        Arc::new(table)
    };

    let store = Arc::new(InMemoryStore::new());
    let mut processor = EventProcessor::new(Arc::clone(&store), tokens);

    let file = tokio::fs::File::open(events_path)
        .await
        .with_context(|| format!("failed to open {}", events_path.display()))?;
    let summary = processor.process_ndjson(BufReader::new(file)).await?;
    let result = &summary.result;

    let counts = store.counts();
    tracing::info!(
        lines = summary.lines,
        events = result.events_processed,
        rejected = summary.rejected,
        anomalies = result.anomalies,
        replayed = result.replayed,
        decimals_fallbacks = result.decimals_fallbacks,
        "replay complete"
    );
    tracing::info!(
        transactions = counts.transactions,
        deposits = counts.deposits,
        orders = counts.orders,
        add_orders = counts.add_orders,
        remove_orders = counts.remove_orders,
        "entities stored"
    );
    tracing::debug!(metrics = ?processor.metrics().snapshot(), "processing metrics");

    if let Some(path) = &config.snapshot_path {
        store.write_snapshot(path).await?;
        tracing::info!("Snapshot written to {}", path.display());
    }

    Ok(())
}
