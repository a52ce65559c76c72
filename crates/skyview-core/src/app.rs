use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::Config;

/// Application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Make sure the data directory for the favorites database exists
    pub fn initialize(&self) -> Result<()> {
        let db_path = self.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory {}", parent.display())
            })?;
        }

        tracing::info!("Application initialized (database: {})", db_path.display());
        Ok(())
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down application");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database_path(&self) -> PathBuf {
        self.config.database_path()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_initialize_creates_data_dir() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.config_dir = dir.path().join("data");

        let app = App::with_config(config);
        app.initialize().unwrap();

        assert!(dir.path().join("data").is_dir());
        assert_eq!(app.database_path(), dir.path().join("data").join("favorites.db"));
    }
}
