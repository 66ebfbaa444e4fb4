//! Consolidated test modules.
//!
//! End-to-end tests that drive the pending-deletion chore against a migrated
//! in-memory database.

#[cfg(all(test, feature = "database-sqlite"))]
mod pending_delete_e2e;
