//! Account operations.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{DbError, models::UserRow};

/// Insert a new account.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO auth_user (username, first_name, last_name, email, date_joined)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, username, first_name, last_name, email, date_joined
        "#,
    )
    .bind(username)
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch an account by its unique username.
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, first_name, last_name, email, date_joined
        FROM auth_user
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

pub(crate) async fn get_user(pool: &SqlitePool, id: i64) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, first_name, last_name, email, date_joined
        FROM auth_user
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
