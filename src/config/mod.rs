//! Configuration for the reclamation service.
//!
//! The service is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [database]
//! type = "sqlite"
//! path = "/var/lib/console/console.db"
//!
//! [payments]
//! type = "stripe"
//! secret_key = "${STRIPE_SECRET_KEY}"
//!
//! [pending_delete]
//! enabled = true
//!
//! [pending_delete.user]
//! enabled = true
//! ```

mod database;
mod observability;
mod payments;
mod pending_delete;

use std::path::Path;

pub use database::*;
pub use observability::*;
pub use payments::*;
pub use pending_delete::*;
use serde::{Deserialize, Serialize};

/// Root configuration.
///
/// All sections are optional; a config that sets nothing leaves the chore disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReclaimerConfig {
    /// Database holding console records and object metadata.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Payment provider used to remove stored cards.
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// The pending-deletion chore.
    #[serde(default)]
    pub pending_delete: PendingDeleteConfig,
}

impl ReclaimerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: ReclaimerConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pending_delete.enabled && self.database.is_none() {
            return Err(ConfigError::Validation(
                "pending_delete requires a database configuration".into(),
            ));
        }

        self.database.validate()?;
        self.payments.validate()?;
        self.observability.validate()?;
        self.pending_delete.validate()?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand `${VAR}` references, ignoring anything after a `#` on the same line.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ConfigError::Validation(format!("invalid interpolation pattern: {}", e)))?;
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let Some(whole) = cap.get(0) else {
                continue;
            };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}
