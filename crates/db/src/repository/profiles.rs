//! Profile operations.

use sqlx::SqlitePool;

use crate::{
    DbError,
    models::{ProfileDetail, ProfileListing, ProfileRow},
    repository::users::get_user,
};

/// Insert the profile of an existing user.
pub async fn create_profile(
    pool: &SqlitePool,
    user_id: i64,
    favorite_city: &str,
) -> Result<ProfileRow, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles_profile (user_id, favorite_city)
        VALUES (?, ?)
        RETURNING id, favorite_city, user_id
        "#,
    )
    .bind(user_id)
    .bind(favorite_city)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Return every profile with its username, in primary-key order.
pub async fn list_profiles(pool: &SqlitePool) -> Result<Vec<ProfileListing>, DbError> {
    let rows = sqlx::query_as::<_, ProfileListing>(
        r#"
        SELECT p.id AS id, u.username AS username
        FROM profiles_profile p
        JOIN auth_user u ON u.id = p.user_id
        ORDER BY p.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch the profile owned by `username`.
pub async fn get_profile_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<ProfileDetail, DbError> {
    let profile = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT p.id AS id, p.favorite_city AS favorite_city, p.user_id AS user_id
        FROM profiles_profile p
        JOIN auth_user u ON u.id = p.user_id
        WHERE u.username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    let user = get_user(pool, profile.user_id).await?;

    Ok(ProfileDetail { profile, user })
}
