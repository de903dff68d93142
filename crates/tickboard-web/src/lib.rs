//! HTTP surface for the tickboard market dashboard.
//!
//! Thin I/O wrapper over `tickboard-core`: two routes, a config layer and
//! process bootstrap. All market data semantics live in the core crate.

pub mod config;
pub mod render;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError, IndexLabel};
pub use routes::router;
pub use state::AppState;
