//! Repository functions — one function per database operation.
//!
//! Typed functions take a `&DbPool` and return a `Result<T, DbError>`.
//! The `dynamic` module works on a single connection so callers can keep a
//! whole batch of statements inside one transaction.

pub mod users;
pub mod lettings;
pub mod profiles;
pub mod dynamic;
