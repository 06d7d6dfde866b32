//! Configuration for the cabana core.
//!
//! A single YAML file configures the core: database location, the timeout
//! bound on best-effort side-effect delivery, and the venue name used in
//! notification payloads. Environment variables override file values.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the database path.
pub const ENV_DATABASE_PATH: &str = "CABANA_DATABASE_PATH";

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use cabana::config::CoreConfig;
///
/// let config = CoreConfig {
///     database_path: Some("/tmp/cabana.db".into()),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Path to the SQLite database file.
    pub database_path: Option<PathBuf>,

    /// Bound on side-effect (notification) delivery, in milliseconds.
    ///
    /// Delivery beyond this bound degrades to silent failure; reservation
    /// correctness never depends on it.
    pub notify_timeout_ms: Option<u64>,

    /// Venue name included in notification payloads.
    pub venue_name: Option<String>,
}

impl CoreConfig {
    /// Loads configuration from a YAML file, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cabana::config::CoreConfig;
    /// use std::path::Path;
    ///
    /// let config = CoreConfig::load(Path::new("/etc/cabana/config.yaml")).unwrap();
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&contents)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from defaults and environment only.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(path) = env::var(ENV_DATABASE_PATH) {
            if !path.is_empty() {
                self.database_path = Some(PathBuf::from(path));
            }
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the notification timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.notify_timeout_ms == Some(0) {
            return Err(Error::Validation {
                field: "notify_timeout_ms".into(),
                message: "notification timeout must be positive".into(),
            });
        }
        Ok(())
    }

    /// Returns the configured notification timeout, defaulting to 2s.
    #[must_use]
    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms.unwrap_or(2000))
    }
}
