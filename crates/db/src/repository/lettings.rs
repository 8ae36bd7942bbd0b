//! Letting and address operations.

use sqlx::SqlitePool;

use crate::{
    DbError,
    models::{AddressRow, LettingDetail, LettingRow, NewAddress},
};

// ---------------------------------------------------------------------------
// lettings_address
// ---------------------------------------------------------------------------

/// Insert a new address.
pub async fn create_address(pool: &SqlitePool, address: &NewAddress) -> Result<AddressRow, DbError> {
    let row = sqlx::query_as::<_, AddressRow>(
        r#"
        INSERT INTO lettings_address (number, street, city, state, zip_code, country_iso_code)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, number, street, city, state, zip_code, country_iso_code
        "#,
    )
    .bind(address.number)
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.state)
    .bind(address.zip_code)
    .bind(&address.country_iso_code)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

async fn get_address(pool: &SqlitePool, id: i64) -> Result<AddressRow, DbError> {
    sqlx::query_as::<_, AddressRow>(
        r#"
        SELECT id, number, street, city, state, zip_code, country_iso_code
        FROM lettings_address
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

// ---------------------------------------------------------------------------
// lettings_letting
// ---------------------------------------------------------------------------

/// Insert a new letting for an existing address.
///
/// An address carries at most one letting; a second one is rejected by the
/// unique constraint on `address_id`.
pub async fn create_letting(
    pool: &SqlitePool,
    title: &str,
    address_id: i64,
) -> Result<LettingRow, DbError> {
    let row = sqlx::query_as::<_, LettingRow>(
        r#"
        INSERT INTO lettings_letting (title, address_id)
        VALUES (?, ?)
        RETURNING id, title, address_id
        "#,
    )
    .bind(title)
    .bind(address_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Return all lettings in primary-key order.
pub async fn list_lettings(pool: &SqlitePool) -> Result<Vec<LettingRow>, DbError> {
    let rows = sqlx::query_as::<_, LettingRow>(
        "SELECT id, title, address_id FROM lettings_letting ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch a single letting and its address.
pub async fn get_letting(pool: &SqlitePool, id: i64) -> Result<LettingDetail, DbError> {
    let letting = sqlx::query_as::<_, LettingRow>(
        "SELECT id, title, address_id FROM lettings_letting WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    let address = get_address(pool, letting.address_id).await?;

    Ok(LettingDetail { letting, address })
}
