use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Page;
use crate::{
    db::error::DbResult,
    models::{EscalatedFreeze, FreezeEvent, FreezeEventType},
};

#[async_trait]
pub trait FreezeEventRepo: Send + Sync {
    /// Insert or replace the event of this type for the user.
    async fn upsert(
        &self,
        user_id: Uuid,
        event_type: FreezeEventType,
        days_till_escalation: Option<i64>,
    ) -> DbResult<FreezeEvent>;
    async fn get(&self, user_id: Uuid, event_type: FreezeEventType)
    -> DbResult<Option<FreezeEvent>>;
    async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<FreezeEvent>>;
    /// Escalated events whose user has been pending deletion since at or
    /// before the threshold given for the event's type.
    ///
    /// `has_more` is set when the page came back full.
    async fn list_escalated_before(
        &self,
        thresholds: &[(FreezeEventType, DateTime<Utc>)],
        offset: usize,
        limit: usize,
    ) -> DbResult<Page<EscalatedFreeze>>;
    async fn delete_by_user_and_type(
        &self,
        user_id: Uuid,
        event_type: FreezeEventType,
    ) -> DbResult<()>;
    async fn delete_all_by_user(&self, user_id: Uuid) -> DbResult<u64>;
}
