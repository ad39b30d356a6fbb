//! Ambient pieces shared by the meteo crates: configuration, application
//! errors and logging setup.

pub mod config;
pub mod error;

pub use config::{Config, ConfigValidationError, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize tracing/logging.
///
/// Reads `RUST_LOG`, falling back to `info`. Safe to call more than once;
/// later calls leave the first subscriber in place.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("meteo core initialized");
    }
    Ok(())
}
