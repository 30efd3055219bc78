//! Subscriber setup for binaries and tests that embed the job.
//!
//! `IRONSWEEP_LOG` holds an `EnvFilter` directive (default
//! `ironsweep=info,warn`); `IRONSWEEP_LOG_FORMAT=json` switches to JSON lines.

use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "IRONSWEEP_LOG";
pub const LOG_FORMAT_ENV: &str = "IRONSWEEP_LOG_FORMAT";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("ironsweep=info,warn"));
    let registry = tracing_subscriber::registry().with(filter);

    let format = env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "compact".to_string());
    match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_ansi(false))
            .try_init(),
        _ => registry.with(fmt::layer().compact()).try_init(),
    }
    .context("tracing subscriber already installed")
}
