//! Upstream market data collaborator boundary.
//!
//! The [`MarketDataClient`] trait exposes the two point-in-time queries the
//! assembler needs: quote/profile metadata and intraday history. Metadata
//! and history are logically independent calls; one succeeding says nothing
//! about the other.

mod yahoo;

use std::future::Future;
use std::pin::Pin;

use time::{OffsetDateTime, Time, UtcOffset};

use crate::domain::{IntradayPoint, Interval, Symbol};
use crate::error::QuoteError;

pub use yahoo::YahooClient;

/// Quote/profile metadata as returned by the upstream provider.
///
/// Every field is optional: a present record with empty fields is a valid
/// answer, distinct from "no record at all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyMetadata {
    pub symbol: Option<String>,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub previous_close: Option<f64>,
    pub last_price: Option<f64>,
    /// Unix epoch seconds of the last market refresh; zero means unknown.
    pub market_time: Option<i64>,
    pub business_summary: Option<String>,
}

/// Half-open time range for a history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl HistoryWindow {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    /// [local midnight, now) in the process's local offset, falling back
    /// to UTC when the local offset cannot be determined.
    pub fn current_day() -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        let now = OffsetDateTime::now_utc().to_offset(offset);
        Self {
            start: now.replace_time(Time::MIDNIGHT),
            end: now,
        }
    }
}

/// Upstream provider contract.
pub trait MarketDataClient: Send + Sync {
    /// Fetch quote/profile metadata for one upstream-qualified symbol.
    ///
    /// # Errors
    ///
    /// [`QuoteError::UnknownSymbol`] when the provider has no record at
    /// all; transport and payload failures map to the other variants.
    fn metadata<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<CompanyMetadata, QuoteError>> + Send + 'a>>;

    /// Fetch intraday samples for `window` at `interval`, ascending by
    /// timestamp. An empty series is a valid answer, not an error.
    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        window: HistoryWindow,
        interval: Interval,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<IntradayPoint>, QuoteError>> + Send + 'a>>;
}
