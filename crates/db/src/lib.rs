//! `db` crate — pure persistence layer.
//!
//! Provides a SQLite connection pool, embedded schema migrations, typed row
//! structs, and repository functions for every table of the lettings site.
//! No business logic lives here.

pub mod error;
pub mod pool;
pub mod repository;
pub mod models;

pub use pool::DbPool;
pub use error::DbError;
