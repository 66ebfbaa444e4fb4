//! Pending-deletion reclamation for an object-storage console.
//!
//! The [`pending_delete::Chore`] periodically finds projects and accounts whose
//! deletion grace period has passed, removes their object data and console
//! records, and marks them Disabled or Deleted.

pub mod clock;
pub mod config;
pub mod db;
pub mod metabase;
pub mod models;
pub mod observability;
pub mod payments;
pub mod pending_delete;

#[cfg(test)]
mod tests;
