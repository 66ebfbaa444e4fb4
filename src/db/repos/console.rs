//! Repositories for the records a deprovisioned project or account leaves behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{ApiKey, CreateDomain, Domain, Entitlement, WebappSession},
};

#[async_trait]
pub trait ApiKeyRepo: Send + Sync {
    async fn create(&self, project_id: Uuid, name: &str) -> DbResult<ApiKey>;
    async fn count_by_project(&self, project_id: Uuid) -> DbResult<i64>;
}

#[async_trait]
pub trait DomainRepo: Send + Sync {
    async fn create(&self, input: CreateDomain) -> DbResult<Domain>;
    async fn list_by_project(&self, project_id: Uuid) -> DbResult<Vec<Domain>>;
}

#[async_trait]
pub trait EntitlementRepo: Send + Sync {
    async fn upsert(&self, scope: &str, features: serde_json::Value) -> DbResult<Entitlement>;
    async fn get_by_scope(&self, scope: &str) -> DbResult<Option<Entitlement>>;
}

#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> DbResult<WebappSession>;
    async fn count_by_user(&self, user_id: Uuid) -> DbResult<i64>;
}

/// Maps console users to their Stripe customer.
#[async_trait]
pub trait StripeCustomerRepo: Send + Sync {
    async fn insert(&self, user_id: Uuid, customer_id: &str) -> DbResult<()>;
    async fn get_customer_id(&self, user_id: Uuid) -> DbResult<Option<String>>;
}
