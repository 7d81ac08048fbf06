//! Client for the external routing oracle: retries, caching, rate limiting,
//! and a straight-line fallback (spec §4.B).
//!
//! The client never raises: a usable geometry is always returned, synthetic
//! if the oracle is unreachable or unconfigured. Synthetic results are
//! counted, not treated as errors.

mod cache;
mod client;
mod config;
mod dyn_oracle;
mod error;
mod profile;
mod response;

pub use client::OracleClient;
pub use config::OracleConfig;
pub use dyn_oracle::RoutingOracle;
pub use profile::Profile;
pub use response::{OracleResponse, OracleStats};
