//! Builds a [`QuoteSummary`] for one upstream-qualified symbol.

use std::sync::Arc;

use crate::domain::{Interval, QuoteSummary, Symbol, UtcDateTime};
use crate::error::QuoteError;
use crate::localize::TextLocalizer;
use crate::market::{HistoryWindow, MarketDataClient};

const DEFAULT_SOURCE_LANG: &str = "en";
const DEFAULT_TARGET_LANG: &str = "pt";

/// Combines metadata, intraday history and localized profile text into a
/// structurally complete per-symbol summary.
///
/// The only hard failure is [`QuoteError::UnknownSymbol`] from the
/// metadata call. Missing optional fields degrade to empty values; a
/// localizer outage or a history transport failure degrades with a warn
/// log instead of failing the assembly.
pub struct QuoteAssembler {
    market: Arc<dyn MarketDataClient>,
    localizer: Arc<dyn TextLocalizer>,
    interval: Interval,
    source_lang: String,
    target_lang: String,
}

impl QuoteAssembler {
    pub fn new(market: Arc<dyn MarketDataClient>, localizer: Arc<dyn TextLocalizer>) -> Self {
        Self {
            market,
            localizer,
            interval: Interval::default(),
            source_lang: String::from(DEFAULT_SOURCE_LANG),
            target_lang: String::from(DEFAULT_TARGET_LANG),
        }
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_languages(
        mut self,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        self.source_lang = source_lang.into();
        self.target_lang = target_lang.into();
        self
    }

    /// Assemble the summary for one upstream-qualified symbol.
    ///
    /// Metadata and history are two independent queries issued
    /// concurrently; neither is conditional on the other.
    pub async fn assemble(&self, symbol: &Symbol) -> Result<QuoteSummary, QuoteError> {
        let window = HistoryWindow::current_day();
        let (metadata, history) = tokio::join!(
            self.market.metadata(symbol),
            self.market.history(symbol, window, self.interval),
        );

        let metadata = metadata?;

        let quotes = match history {
            Ok(mut points) => {
                points.sort_by_key(|point| point.ts);
                points
            }
            Err(error) => {
                tracing::warn!(symbol = %symbol, %error, "intraday history unavailable, serving empty series");
                Vec::new()
            }
        };

        let profile = match metadata
            .business_summary
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            Some(text) => match self
                .localizer
                .translate(text, &self.source_lang, &self.target_lang)
                .await
            {
                Ok(translated) => translated,
                Err(error) => {
                    tracing::warn!(symbol = %symbol, %error, "profile localization failed, serving empty profile");
                    String::new()
                }
            },
            None => String::new(),
        };

        Ok(QuoteSummary {
            symbol: metadata.symbol.unwrap_or_else(|| symbol.to_string()),
            name: metadata.long_name.unwrap_or_default(),
            sector: metadata.sector.unwrap_or_default(),
            country: metadata.country.unwrap_or_default(),
            previous_close: metadata.previous_close,
            last_price: metadata.last_price,
            // Epoch zero means "no refresh time", not 1970-01-01.
            last_refresh: metadata
                .market_time
                .filter(|&epoch| epoch > 0)
                .and_then(|epoch| UtcDateTime::from_unix_timestamp(epoch).ok()),
            profile,
            quotes,
        })
    }
}
