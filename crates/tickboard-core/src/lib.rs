//! # Tickboard Core
//!
//! Market data aggregation and cache layer for the tickboard dashboard.
//!
//! The crate pulls quote metadata and intraday history from an upstream
//! provider, localizes free-text company profiles, and serves repeated
//! lookups from a process-wide TTL cache so the upstream is never hit
//! twice for the same symbol within a cache window.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`assemble`] | Builds a [`QuoteSummary`] for one symbol |
//! | [`basket`] | Order-preserving multi-symbol aggregation |
//! | [`cache`] | Single-flight TTL response cache |
//! | [`domain`] | Symbols, timestamps, intervals, summary records |
//! | [`error`] | Error taxonomy |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`localize`] | Best-effort profile text translation |
//! | [`market`] | Upstream market data client |
//! | [`resolver`] | Regional-exchange symbol qualification |
//!
//! ## Control flow
//!
//! ```text
//! caller symbol
//!    │
//!    ▼
//! SymbolResolver ──▶ ResponseCache ──miss──▶ QuoteAssembler
//!                        │                      │
//!                      hit│                     ├─▶ MarketDataClient
//!                        ▼                      └─▶ TextLocalizer
//!                   QuoteSummary ◀──────────────┘
//! ```
//!
//! A failed compute is never cached; per-symbol failures inside a basket
//! are captured per entry instead of aborting the whole aggregate.

pub mod assemble;
pub mod basket;
pub mod cache;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod localize;
pub mod market;
pub mod resolver;

pub use assemble::QuoteAssembler;
pub use basket::{BasketAggregator, BasketEntry};
pub use cache::ResponseCache;
pub use domain::{IntradayPoint, Interval, QuoteSummary, Symbol, UtcDateTime};
pub use error::{LocalizeError, QuoteError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use localize::{GoogleTranslateClient, NoopLocalizer, TextLocalizer};
pub use market::{CompanyMetadata, HistoryWindow, MarketDataClient, YahooClient};
pub use resolver::SymbolResolver;
