//! Pending-deletion reclamation configuration.
//!
//! # Example
//!
//! ```toml
//! [pending_delete]
//! enabled = true
//! interval_secs = 86400
//! list_limit = 100
//! delete_concurrency = 4
//!
//! [pending_delete.project]
//! enabled = true
//! buffer_time_secs = 2592000
//!
//! [pending_delete.violation_freeze]
//! enabled = true
//! buffer_time_secs = 604800
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::models::FreezeEventType;

/// Configuration for the pending-deletion chore.
///
/// The chore is off unless `enabled` is set, and each flow is additionally
/// gated by its own table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PendingDeleteConfig {
    /// Whether the chore runs at all.
    /// Default: false
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between ticks.
    /// Default: 86400 (once per day)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Maximum candidates fetched per page.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Maximum candidates processed concurrently within a page.
    #[serde(default = "default_delete_concurrency")]
    pub delete_concurrency: usize,

    /// Domain used for the placeholder email of deactivated accounts.
    #[serde(default = "default_anonymized_email_domain")]
    pub anonymized_email_domain: String,

    /// Projects marked for deletion directly.
    #[serde(default)]
    pub project: FlowConfig,

    /// Users marked for deletion directly.
    #[serde(default)]
    pub user: FlowConfig,

    /// Users whose violation freeze escalated.
    #[serde(default)]
    pub violation_freeze: FlowConfig,

    /// Users whose billing freeze escalated.
    #[serde(default)]
    pub billing_freeze: FlowConfig,

    /// Users whose trial expiration freeze escalated.
    #[serde(default)]
    pub trial_freeze: FlowConfig,

    /// Tuning for bulk object deletion.
    #[serde(default)]
    pub object_deletion: ObjectDeletionConfig,
}

impl Default for PendingDeleteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            list_limit: default_list_limit(),
            delete_concurrency: default_delete_concurrency(),
            anonymized_email_domain: default_anonymized_email_domain(),
            project: FlowConfig::default(),
            user: FlowConfig::default(),
            violation_freeze: FlowConfig::default(),
            billing_freeze: FlowConfig::default(),
            trial_freeze: FlowConfig::default(),
            object_deletion: ObjectDeletionConfig::default(),
        }
    }
}

impl PendingDeleteConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Freeze types whose escalation leads to account deletion, with their settings.
    pub fn freeze_flows(&self) -> [(FreezeEventType, &FlowConfig); 3] {
        [
            (FreezeEventType::ViolationFreeze, &self.violation_freeze),
            (FreezeEventType::BillingFreeze, &self.billing_freeze),
            (FreezeEventType::TrialExpirationFreeze, &self.trial_freeze),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "pending_delete.interval_secs must be at least 1".into(),
            ));
        }
        if self.list_limit == 0 {
            return Err(ConfigError::Validation(
                "pending_delete.list_limit must be at least 1".into(),
            ));
        }
        if self.delete_concurrency == 0 {
            return Err(ConfigError::Validation(
                "pending_delete.delete_concurrency must be at least 1".into(),
            ));
        }
        if self.anonymized_email_domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pending_delete.anonymized_email_domain cannot be empty".into(),
            ));
        }
        self.object_deletion.validate()
    }
}

fn default_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_list_limit() -> usize {
    100
}

fn default_delete_concurrency() -> usize {
    1
}

fn default_anonymized_email_domain() -> String {
    "deleted.invalid".to_string()
}

/// Per-flow switch and grace period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    #[serde(default)]
    pub enabled: bool,

    /// How long a record must stay marked before it is reclaimed.
    /// Default: 2592000 (30 days)
    #[serde(default = "default_buffer_time_secs")]
    pub buffer_time_secs: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_time_secs: default_buffer_time_secs(),
        }
    }
}

impl FlowConfig {
    pub fn buffer_time(&self) -> chrono::Duration {
        i64::try_from(self.buffer_time_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

fn default_buffer_time_secs() -> u64 {
    30 * 24 * 60 * 60
}

/// Parameters passed to the object store for each bucket purge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectDeletionConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum staleness of reads used to enumerate objects.
    #[serde(default = "default_max_staleness_secs")]
    pub max_staleness_secs: u64,

    #[serde(default = "default_max_commit_delay_ms")]
    pub max_commit_delay_ms: u64,
}

impl Default for ObjectDeletionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_staleness_secs: default_max_staleness_secs(),
            max_commit_delay_ms: default_max_commit_delay_ms(),
        }
    }
}

impl ObjectDeletionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "pending_delete.object_deletion.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn max_staleness(&self) -> Duration {
        Duration::from_secs(self.max_staleness_secs)
    }

    pub fn max_commit_delay(&self) -> Duration {
        Duration::from_millis(self.max_commit_delay_ms)
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_max_staleness_secs() -> u64 {
    10
}

fn default_max_commit_delay_ms() -> u64 {
    25
}
