use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::error::ReclaimResult;
use crate::{
    db::DbPool,
    models::{FreezeEventType, UpdateUser},
    payments::CreditCards,
};

/// Deactivates an account: payment cards first, then sessions, the anonymized
/// user record and the triggering freeze event in one transaction.
///
/// Card removal happens outside the transaction and must succeed before any row
/// is touched, so an account is never marked Deleted with cards still on file.
#[derive(Clone)]
pub struct AccountDeactivator {
    db: Arc<DbPool>,
    credit_cards: Arc<dyn CreditCards>,
    email_domain: String,
}

impl AccountDeactivator {
    pub fn new(db: Arc<DbPool>, credit_cards: Arc<dyn CreditCards>, email_domain: String) -> Self {
        Self {
            db,
            credit_cards,
            email_domain,
        }
    }

    pub async fn deactivate(
        &self,
        task: &'static str,
        user_id: Uuid,
        freeze: Option<FreezeEventType>,
    ) -> ReclaimResult<()> {
        let cards = self.credit_cards.remove_all(user_id).await?;

        let mut tx = self.db.begin().await?;
        let sessions = tx.delete_sessions_by_user(user_id).await?;
        tx.update_user(user_id, UpdateUser::anonymize(user_id, &self.email_domain))
            .await?;
        if let Some(event_type) = freeze {
            tx.delete_freeze_event(user_id, event_type).await?;
        }
        tx.commit().await?;

        debug!(task, %user_id, cards, sessions, freeze = ?freeze, "Account deactivated");
        Ok(())
    }
}
