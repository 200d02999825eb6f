//! # Tracing Setup
//!
//! Installs the global `tracing` subscriber for services embedding this
//! crate. `RUST_LOG` wins; otherwise everything at `info` and above.

use tracing_subscriber::EnvFilter;

use crate::error::{BookingError, BookingResult};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a formatted subscriber with an env-driven filter.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing() -> BookingResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| BookingError::Config(format!("tracing already initialized: {e}")))
}
