mod buckets;
mod common;
mod console;
mod freeze_events;
mod projects;
mod tx;
mod users;

pub use buckets::SqliteBucketRepo;
pub use console::{
    SqliteApiKeyRepo, SqliteDomainRepo, SqliteEntitlementRepo, SqliteSessionRepo,
    SqliteStripeCustomerRepo,
};
pub use freeze_events::SqliteFreezeEventRepo;
pub use projects::SqliteProjectRepo;
pub use tx::SqliteConsoleTx;
pub use users::SqliteUserRepo;
