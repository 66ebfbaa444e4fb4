use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Payment provider used to detach stored cards when an account is deactivated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub enum PaymentsConfig {
    /// No provider. Card removal fails, which aborts account deactivation.
    #[default]
    Disabled,

    /// Stripe.
    Stripe(StripeConfig),
}

impl PaymentsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PaymentsConfig::Disabled => Ok(()),
            PaymentsConfig::Stripe(c) => c.validate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StripeConfig {
    /// Secret API key. Usually `${STRIPE_SECRET_KEY}`.
    pub secret_key: String,

    /// API base URL.
    #[serde(default = "default_stripe_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl StripeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::Validation(
                "payments.secret_key cannot be empty".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "payments.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

fn default_stripe_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
