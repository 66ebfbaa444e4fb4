mod error;
pub mod repos;
#[cfg(feature = "database-sqlite")]
pub mod sqlite;

#[cfg(all(test, feature = "database-sqlite"))]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::{
    clock::{Clock, SystemClock},
    config::DatabaseConfig,
};

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    projects: Arc<dyn ProjectRepo>,
    users: Arc<dyn UserRepo>,
    freeze_events: Arc<dyn FreezeEventRepo>,
    buckets: Arc<dyn BucketRepo>,
    api_keys: Arc<dyn ApiKeyRepo>,
    domains: Arc<dyn DomainRepo>,
    entitlements: Arc<dyn EntitlementRepo>,
    sessions: Arc<dyn SessionRepo>,
    stripe_customers: Arc<dyn StripeCustomerRepo>,
}

enum PoolStorage {
    #[cfg(feature = "database-sqlite")]
    Sqlite(sqlx::SqlitePool),
    #[cfg(not(feature = "database-sqlite"))]
    _None(std::convert::Infallible),
}

/// Borrowed reference to the underlying database pool.
pub enum DbPoolRef<'a> {
    #[cfg(feature = "database-sqlite")]
    Sqlite(&'a sqlx::SqlitePool),
    #[cfg(not(feature = "database-sqlite"))]
    _None(std::convert::Infallible, std::marker::PhantomData<&'a ()>),
}

/// Console database pool.
///
/// Repositories are cached at construction time to avoid allocation on each access.
/// Status changes are stamped with the pool's clock.
pub struct DbPool {
    inner: PoolStorage,
    repos: CachedRepos,
    clock: Arc<dyn Clock>,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    #[cfg(feature = "database-sqlite")]
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        Self::from_sqlite_with_clock(pool, Arc::new(SystemClock))
    }

    /// Create a DbPool whose status timestamps come from `clock`.
    #[cfg(feature = "database-sqlite")]
    pub fn from_sqlite_with_clock(pool: sqlx::SqlitePool, clock: Arc<dyn Clock>) -> Self {
        let repos = CachedRepos {
            projects: Arc::new(sqlite::SqliteProjectRepo::new(pool.clone(), clock.clone())),
            users: Arc::new(sqlite::SqliteUserRepo::new(pool.clone(), clock.clone())),
            freeze_events: Arc::new(sqlite::SqliteFreezeEventRepo::new(
                pool.clone(),
                clock.clone(),
            )),
            buckets: Arc::new(sqlite::SqliteBucketRepo::new(pool.clone(), clock.clone())),
            api_keys: Arc::new(sqlite::SqliteApiKeyRepo::new(pool.clone(), clock.clone())),
            domains: Arc::new(sqlite::SqliteDomainRepo::new(pool.clone(), clock.clone())),
            entitlements: Arc::new(sqlite::SqliteEntitlementRepo::new(
                pool.clone(),
                clock.clone(),
            )),
            sessions: Arc::new(sqlite::SqliteSessionRepo::new(pool.clone())),
            stripe_customers: Arc::new(sqlite::SqliteStripeCustomerRepo::new(
                pool.clone(),
                clock.clone(),
            )),
        };
        DbPool {
            inner: PoolStorage::Sqlite(pool),
            repos,
            clock,
        }
    }

    /// Create a database pool from configuration
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::None => Err(DbError::NotConfigured),
            #[cfg(feature = "database-sqlite")]
            DatabaseConfig::Sqlite(cfg) => {
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .connect_with(
                        sqlx::sqlite::SqliteConnectOptions::new()
                            .filename(&cfg.path)
                            .create_if_missing(cfg.create_if_missing)
                            .journal_mode(if cfg.wal_mode {
                                sqlx::sqlite::SqliteJournalMode::Wal
                            } else {
                                sqlx::sqlite::SqliteJournalMode::Delete
                            })
                            .busy_timeout(std::time::Duration::from_millis(cfg.busy_timeout_ms)),
                    )
                    .await?;

                Ok(Self::from_sqlite(pool))
            }
        }
    }

    /// Run database migrations using sqlx's migration runner
    pub async fn run_migrations(&self) -> DbResult<()> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => {
                tracing::info!("Running SQLite migrations");
                sqlx::migrate!("./migrations_sqlx/sqlite").run(pool).await?;
                tracing::info!("SQLite migrations completed successfully");
                Ok(())
            }
            #[cfg(not(feature = "database-sqlite"))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }

    /// Start a console transaction.
    pub async fn begin(&self) -> DbResult<Box<dyn ConsoleTx>> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => {
                let tx = pool.begin().await?;
                Ok(Box::new(sqlite::SqliteConsoleTx::new(tx, self.clock.clone())))
            }
            #[cfg(not(feature = "database-sqlite"))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }

    /// Get project repository
    pub fn projects(&self) -> Arc<dyn ProjectRepo> {
        Arc::clone(&self.repos.projects)
    }

    /// Get user repository
    pub fn users(&self) -> Arc<dyn UserRepo> {
        Arc::clone(&self.repos.users)
    }

    /// Get account freeze event repository
    pub fn freeze_events(&self) -> Arc<dyn FreezeEventRepo> {
        Arc::clone(&self.repos.freeze_events)
    }

    /// Get bucket metainfo repository
    pub fn buckets(&self) -> Arc<dyn BucketRepo> {
        Arc::clone(&self.repos.buckets)
    }

    /// Get API key repository
    pub fn api_keys(&self) -> Arc<dyn ApiKeyRepo> {
        Arc::clone(&self.repos.api_keys)
    }

    /// Get custom domain repository
    pub fn domains(&self) -> Arc<dyn DomainRepo> {
        Arc::clone(&self.repos.domains)
    }

    /// Get entitlement repository
    pub fn entitlements(&self) -> Arc<dyn EntitlementRepo> {
        Arc::clone(&self.repos.entitlements)
    }

    /// Get webapp session repository
    pub fn sessions(&self) -> Arc<dyn SessionRepo> {
        Arc::clone(&self.repos.sessions)
    }

    /// Get Stripe customer mapping repository
    pub fn stripe_customers(&self) -> Arc<dyn StripeCustomerRepo> {
        Arc::clone(&self.repos.stripe_customers)
    }

    /// Get a reference to the underlying database pool.
    pub fn pool(&self) -> DbPoolRef<'_> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => DbPoolRef::Sqlite(pool),
            #[cfg(not(feature = "database-sqlite"))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }
}
