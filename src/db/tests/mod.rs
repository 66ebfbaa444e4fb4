//! Shared database repository test infrastructure
//!
//! Each repository has a test module containing shared test functions that
//! take a test context, plus a `sqlite_tests` module that runs them against
//! an in-memory database.

mod buckets;
