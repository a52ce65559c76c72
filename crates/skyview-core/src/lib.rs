pub mod app;
pub mod config;
pub mod error;
pub mod theme;

pub use app::App;
pub use config::{
    Config, GeocodingConfig, StorageConfig, UiConfig, ValidationResult, WeatherConfig,
};
pub use error::{
    AppError, ConfigError, DatabaseError, NetworkError, ReqwestErrorExt, RusqliteErrorExt,
    ValidationError, WeatherError,
};
pub use theme::{Palette, ThemeName};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Log output goes to stderr so command output on stdout stays clean.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("SkyView core initialized");
    Ok(())
}
