//! Domain types for the aggregation layer.
//!
//! All constructors validate their invariants; invalid states are
//! unrepresentable past the boundary. Every type serializes to the JSON
//! shape the HTTP surface exposes.

mod interval;
mod summary;
mod symbol;
mod timestamp;

pub use interval::Interval;
pub use summary::{IntradayPoint, QuoteSummary};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
