//! Database layer
//!
//! SQLite-backed storage for the Brightfold backend. The site ships as a
//! single binary with an embedded database file, so there is exactly one
//! driver and the repositories speak `SqlitePool` directly.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
