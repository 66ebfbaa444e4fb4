use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    clock::Clock,
    db::{
        error::{DbError, DbResult},
        repos::{ApiKeyRepo, DomainRepo, EntitlementRepo, SessionRepo, StripeCustomerRepo},
    },
    models::{ApiKey, CreateDomain, Domain, Entitlement, WebappSession},
};

pub struct SqliteApiKeyRepo {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteApiKeyRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl ApiKeyRepo for SqliteApiKeyRepo {
    async fn create(&self, project_id: Uuid, name: &str) -> DbResult<ApiKey> {
        let id = Uuid::new_v4();
        let now = self.clock.now();

        sqlx::query("INSERT INTO api_keys (id, project_id, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(id.to_string())
            .bind(project_id.to_string())
            .bind(name)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(ApiKey {
            id,
            project_id,
            name: name.to_string(),
            created_at: now,
        })
    }

    async fn count_by_project(&self, project_id: Uuid) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys WHERE project_id = ?")
            .bind(project_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub struct SqliteDomainRepo {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteDomainRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl DomainRepo for SqliteDomainRepo {
    async fn create(&self, input: CreateDomain) -> DbResult<Domain> {
        let now = self.clock.now();

        sqlx::query(
            r#"
            INSERT INTO domains (project_id, subdomain, created_by, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(input.project_id.to_string())
        .bind(&input.subdomain)
        .bind(input.created_by.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!("Domain '{}' already exists for this project", input.subdomain),
            ),
            _ => DbError::from(e),
        })?;

        Ok(Domain {
            project_id: input.project_id,
            subdomain: input.subdomain,
            created_by: input.created_by,
            created_at: now,
        })
    }

    async fn list_by_project(&self, project_id: Uuid) -> DbResult<Vec<Domain>> {
        let rows = sqlx::query(
            r#"
            SELECT project_id, subdomain, created_by, created_at
            FROM domains
            WHERE project_id = ?
            ORDER BY subdomain ASC
            "#,
        )
        .bind(project_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Domain {
                    project_id: parse_uuid(&row.get::<String, _>("project_id"))?,
                    subdomain: row.get("subdomain"),
                    created_by: parse_uuid(&row.get::<String, _>("created_by"))?,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}

pub struct SqliteEntitlementRepo {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteEntitlementRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl EntitlementRepo for SqliteEntitlementRepo {
    async fn upsert(&self, scope: &str, features: serde_json::Value) -> DbResult<Entitlement> {
        let now = self.clock.now();
        let features_json = serde_json::to_string(&features)?;

        sqlx::query(
            r#"
            INSERT INTO entitlements (scope, features, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (scope) DO UPDATE SET
                features = excluded.features,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(scope)
        .bind(&features_json)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Entitlement {
            scope: scope.to_string(),
            features,
            updated_at: now,
        })
    }

    async fn get_by_scope(&self, scope: &str) -> DbResult<Option<Entitlement>> {
        let row = sqlx::query("SELECT scope, features, updated_at FROM entitlements WHERE scope = ?")
            .bind(scope)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let features: String = row.get("features");
                Ok(Some(Entitlement {
                    scope: row.get("scope"),
                    features: serde_json::from_str(&features)?,
                    updated_at: row.get("updated_at"),
                }))
            }
            None => Ok(None),
        }
    }
}

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepo for SqliteSessionRepo {
    async fn create(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> DbResult<WebappSession> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO webapp_sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(WebappSession {
            id,
            user_id,
            expires_at,
        })
    }

    async fn count_by_user(&self, user_id: Uuid) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM webapp_sessions WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub struct SqliteStripeCustomerRepo {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteStripeCustomerRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl StripeCustomerRepo for SqliteStripeCustomerRepo {
    async fn insert(&self, user_id: Uuid, customer_id: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO stripe_customers (user_id, customer_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(customer_id)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("Stripe customer '{}' is already mapped", customer_id))
            }
            _ => DbError::from(e),
        })?;

        Ok(())
    }

    async fn get_customer_id(&self, user_id: Uuid) -> DbResult<Option<String>> {
        let customer_id =
            sqlx::query_scalar("SELECT customer_id FROM stripe_customers WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        Ok(customer_id)
    }
}
