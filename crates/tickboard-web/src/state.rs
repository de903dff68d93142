//! Shared application state, constructed once at startup.

use std::sync::Arc;
use std::time::Duration;

use tickboard_core::{
    BasketAggregator, GoogleTranslateClient, HttpClient, NoopLocalizer, QuoteAssembler,
    ReqwestHttpClient, ResponseCache, Symbol, SymbolResolver, TextLocalizer, YahooClient,
};

use crate::config::{Config, IndexLabel};

/// Injected handles every request handler works against.
///
/// The cache inside the aggregator is the only shared mutable state; it
/// lives for the process lifetime and is torn down with it.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: BasketAggregator,
    /// Caller-facing basket symbols, in configured order.
    pub basket_symbols: Vec<Symbol>,
    pub world_indices: Vec<IndexLabel>,
}

/// Wire the production collaborators together from configuration.
pub fn build_state(config: &Config) -> AppState {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let timeout = Duration::from_millis(config.upstream_timeout_ms);

    let market = Arc::new(YahooClient::new(Arc::clone(&http)).with_timeout(timeout));
    let localizer: Arc<dyn TextLocalizer> = if config.translate_profiles {
        Arc::new(GoogleTranslateClient::new(http).with_timeout(timeout))
    } else {
        Arc::new(NoopLocalizer)
    };

    let assembler = Arc::new(
        QuoteAssembler::new(market, localizer)
            .with_languages(&config.profile_source_lang, &config.profile_target_lang),
    );
    let resolver = Arc::new(SymbolResolver::new(
        config.regional_symbols.iter().cloned(),
        &config.regional_suffix,
    ));
    let cache = ResponseCache::new(Duration::from_secs(config.cache_ttl_secs));

    let aggregator = BasketAggregator::new(resolver, cache, assembler)
        .with_parallelism(config.basket_parallelism);

    let basket_symbols = config
        .regional_symbols
        .iter()
        .filter_map(|raw| match Symbol::parse(raw) {
            Ok(symbol) => Some(symbol),
            Err(error) => {
                tracing::warn!(symbol = raw.as_str(), %error, "skipping unparseable basket symbol");
                None
            }
        })
        .collect();

    AppState {
        aggregator,
        basket_symbols,
        world_indices: config.world_indices.clone(),
    }
}
