// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::alert::ALERT_TARGET;
use crate::error::{FixedPointError, Result};

/// Filter used when `RUST_LOG` is unset: alert warnings only.
pub fn default_filter() -> String {
    format!("{}=warn", ALERT_TARGET)
}

/// Initialize logging from `RUST_LOG`, falling back to [`default_filter`].
pub fn init_logging() -> Result<()> {
    init_logging_with(&std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter()))
}

/// Initialize logging with explicit filter directives, e.g. `"fixedpoint::log=debug"`.
///
/// Fails instead of panicking when a global subscriber is already installed.
pub fn init_logging_with(filter: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|e| FixedPointError::InvalidValue(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| FixedPointError::InvalidValue(format!("Logging already initialized: {}", e)))
}
