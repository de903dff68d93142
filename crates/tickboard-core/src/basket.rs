//! Order-preserving aggregation of a symbol basket.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::assemble::QuoteAssembler;
use crate::cache::ResponseCache;
use crate::domain::{QuoteSummary, Symbol};
use crate::error::QuoteError;
use crate::resolver::SymbolResolver;

const DEFAULT_PARALLELISM: usize = 4;

/// One basket slot: either a summary or the captured per-symbol failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BasketEntry {
    Ok {
        symbol: String,
        summary: QuoteSummary,
    },
    Failed {
        symbol: String,
        error: String,
    },
}

impl BasketEntry {
    /// The caller-facing symbol this entry is about.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Ok { symbol, .. } | Self::Failed { symbol, .. } => symbol,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Drives the assembler over N symbols with bounded parallelism.
///
/// Resolution, per-symbol caching and assembly are composed here; one
/// symbol's failure is captured in its own entry and never aborts the
/// rest. The aggregate always returns one entry per input symbol, in
/// input order.
#[derive(Clone)]
pub struct BasketAggregator {
    resolver: Arc<SymbolResolver>,
    cache: ResponseCache,
    assembler: Arc<QuoteAssembler>,
    ttl: Option<Duration>,
    parallelism: usize,
}

impl BasketAggregator {
    pub fn new(
        resolver: Arc<SymbolResolver>,
        cache: ResponseCache,
        assembler: Arc<QuoteAssembler>,
    ) -> Self {
        Self {
            resolver,
            cache,
            assembler,
            ttl: None,
            parallelism: DEFAULT_PARALLELISM,
        }
    }

    /// Override the cache TTL for summaries (defaults to the cache's own).
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Bound on concurrent upstream fetches during aggregation.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Single-symbol lookup: resolve, then serve through the cache.
    ///
    /// Cache key scheme is `summary:{resolvedSymbol}`, so the single-quote
    /// endpoint and the dashboard share entries per resolved symbol.
    pub async fn lookup(&self, symbol: &Symbol) -> Result<QuoteSummary, QuoteError> {
        let resolved = self.resolver.resolve(symbol);
        let key = format!("summary:{resolved}");
        let assembler = Arc::clone(&self.assembler);
        self.cache
            .get_or_compute(&key, self.ttl, move || async move {
                assembler.assemble(&resolved).await
            })
            .await
    }

    /// Aggregate the basket, preserving input order by symbol index
    /// regardless of completion order.
    pub async fn aggregate(&self, symbols: &[Symbol]) -> Vec<BasketEntry> {
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut tasks: JoinSet<(usize, BasketEntry)> = JoinSet::new();

        for (index, symbol) in symbols.iter().cloned().enumerate() {
            let aggregator = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let entry = match aggregator.lookup(&symbol).await {
                    Ok(summary) => BasketEntry::Ok {
                        symbol: symbol.to_string(),
                        summary,
                    },
                    Err(error) => {
                        tracing::warn!(symbol = %symbol, %error, "basket entry failed");
                        BasketEntry::Failed {
                            symbol: symbol.to_string(),
                            error: error.to_string(),
                        }
                    }
                };
                (index, entry)
            });
        }

        let mut entries: Vec<Option<BasketEntry>> = symbols.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, entry)) => entries[index] = Some(entry),
                Err(error) => tracing::error!(%error, "basket task aborted"),
            }
        }

        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.unwrap_or_else(|| BasketEntry::Failed {
                    symbol: symbols[index].to_string(),
                    error: String::from("aggregation task aborted"),
                })
            })
            .collect()
    }
}
