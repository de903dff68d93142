use thiserror::Error;

/// Validation errors raised by domain type constructors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid interval '{value}', expected one of 1m, 5m, 15m, 1h, 1d")]
    InvalidInterval { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix timestamp {value} is out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("intraday point high must be >= low")]
    InvalidPointRange,
    #[error("intraday point open/close must be within high/low range")]
    InvalidPointBounds,
}

/// Failures while fetching or assembling a per-symbol summary.
///
/// `UnknownSymbol` is the only hard assembly failure; everything a
/// caller sees carries the offending symbol and a cause string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("no upstream record for symbol '{symbol}'")]
    UnknownSymbol { symbol: String },
    #[error("upstream unavailable for '{symbol}': {message}")]
    Unavailable { symbol: String, message: String },
    #[error("malformed upstream payload for '{symbol}': {message}")]
    Malformed { symbol: String, message: String },
}

impl QuoteError {
    pub fn unknown(symbol: impl Into<String>) -> Self {
        Self::UnknownSymbol {
            symbol: symbol.into(),
        }
    }

    pub fn unavailable(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            symbol: symbol.into(),
            message: message.into(),
        }
    }

    pub fn malformed(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            symbol: symbol.into(),
            message: message.into(),
        }
    }

    /// The symbol the failure is about.
    pub fn symbol(&self) -> &str {
        match self {
            Self::UnknownSymbol { symbol }
            | Self::Unavailable { symbol, .. }
            | Self::Malformed { symbol, .. } => symbol,
        }
    }
}

/// Failures from the best-effort text localizer.
///
/// Never escapes assembly: the assembler degrades to an empty profile.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocalizeError {
    #[error("localizer transport error: {message}")]
    Transport { message: String },
    #[error("localizer returned status {status}")]
    Status { status: u16 },
    #[error("malformed localizer payload: {message}")]
    Malformed { message: String },
}
