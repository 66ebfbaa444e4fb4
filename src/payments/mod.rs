//! Payment provider integration.
//!
//! Account deactivation must remove every stored card before the account row
//! is anonymized. [`CreditCards`] is the seam the chore calls; the provider is
//! chosen by `[payments]` in the config.

mod stripe;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use stripe::StripeCreditCards;

use crate::{
    config::PaymentsConfig,
    db::{DbError, DbPool},
};

/// Errors returned by payment providers.
#[derive(Debug, Error)]
pub enum PaymentsError {
    #[error("Payment provider not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

pub type PaymentsResult<T> = Result<T, PaymentsError>;

/// Stored payment cards of console users.
#[async_trait]
pub trait CreditCards: Send + Sync {
    /// Detach every card stored for the user. Returns the number removed.
    ///
    /// A user without a payment profile has nothing to remove and succeeds.
    async fn remove_all(&self, user_id: Uuid) -> PaymentsResult<u64>;
}

/// Used when no provider is configured. Always fails, so an account is never
/// deactivated while its cards might still be on file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCreditCards;

#[async_trait]
impl CreditCards for DisabledCreditCards {
    async fn remove_all(&self, _user_id: Uuid) -> PaymentsResult<u64> {
        Err(PaymentsError::NotConfigured)
    }
}

/// Build the configured provider.
pub fn from_config(
    config: &PaymentsConfig,
    db: Arc<DbPool>,
) -> PaymentsResult<Arc<dyn CreditCards>> {
    match config {
        PaymentsConfig::Disabled => {
            tracing::warn!(
                "No payment provider configured; account deactivation will fail until one is"
            );
            Ok(Arc::new(DisabledCreditCards))
        }
        PaymentsConfig::Stripe(cfg) => {
            Ok(Arc::new(StripeCreditCards::new(cfg, db.stripe_customers())?))
        }
    }
}
