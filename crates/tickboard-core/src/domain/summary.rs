use serde::{Deserialize, Serialize};

use crate::domain::UtcDateTime;
use crate::error::ValidationError;

/// One OHLCV sample from the current trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradayPoint {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl IntradayPoint {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidPointRange);
        }
        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidPointBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Per-symbol aggregate served by the single-quote and dashboard views.
///
/// Structurally complete by construction: absent upstream data degrades to
/// empty strings or `None`, never to a missing field. `last_refresh` is
/// `None` when the provider epoch is absent or zero, so a misleading 1970
/// timestamp can never appear. `quotes` is ordered ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub country: String,
    pub previous_close: Option<f64>,
    pub last_price: Option<f64>,
    pub last_refresh: Option<UtcDateTime>,
    pub profile: String,
    pub quotes: Vec<IntradayPoint>,
}

impl QuoteSummary {
    /// A summary with every optional field empty, for the degenerate case
    /// of a known symbol with no populated metadata.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: String::new(),
            sector: String::new(),
            country: String::new(),
            previous_close: None,
            last_price: None,
            last_refresh: None,
            profile: String::new(),
            quotes: Vec::new(),
        }
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
