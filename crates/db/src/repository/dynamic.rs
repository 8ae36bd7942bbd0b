//! Schema introspection and dynamically typed row access.
//!
//! For callers that only learn a table's shape at run time. Column values
//! travel as JSON scalars (`null`, bool, number, string); identifiers are
//! always quoted before they reach the SQL text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::DbError;

/// A column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

/// A foreign key as reported by `PRAGMA foreign_key_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    /// Referencing column on the inspected table.
    pub column: String,
    /// Referenced table.
    pub table: String,
    /// Referenced column; `None` means the referenced table's primary key.
    pub to_column: Option<String>,
}

/// Quote an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Columns of `table` in declaration order. Empty when the table does not exist.
pub async fn table_columns(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<ColumnInfo>, DbError> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table));
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

    rows.iter()
        .map(|row| -> Result<ColumnInfo, DbError> {
            Ok(ColumnInfo {
                name: row.try_get("name")?,
                declared_type: row.try_get("type")?,
                not_null: row.try_get::<i64, _>("notnull")? != 0,
                primary_key: row.try_get::<i64, _>("pk")? > 0,
            })
        })
        .collect()
}

/// Single-column foreign keys declared on `table`.
pub async fn foreign_keys(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<ForeignKeyInfo>, DbError> {
    let sql = format!("PRAGMA foreign_key_list({})", quote_ident(table));
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

    rows.iter()
        .map(|row| -> Result<ForeignKeyInfo, DbError> {
            Ok(ForeignKeyInfo {
                column: row.try_get("from")?,
                table: row.try_get("table")?,
                to_column: row.try_get("to")?,
            })
        })
        .collect()
}

/// Every row of `table`, ordered by `order_by`.
pub async fn fetch_rows(
    conn: &mut SqliteConnection,
    table: &str,
    order_by: &str,
) -> Result<Vec<Map<String, Value>>, DbError> {
    let sql = format!(
        "SELECT * FROM {} ORDER BY {}",
        quote_ident(table),
        quote_ident(order_by)
    );
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
    rows.iter().map(row_to_map).collect()
}

/// The row of `table` whose `key_column` equals `key`, if any.
pub async fn fetch_row(
    conn: &mut SqliteConnection,
    table: &str,
    key_column: &str,
    key: &Value,
) -> Result<Option<Map<String, Value>>, DbError> {
    let sql = format!(
        "SELECT * FROM {} WHERE {} = ?",
        quote_ident(table),
        quote_ident(key_column)
    );
    let row = bind_value(sqlx::query(&sql), key)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(row_to_map).transpose()
}

/// Insert one row built from `values`. An empty map inserts the column defaults.
pub async fn insert_row(
    conn: &mut SqliteConnection,
    table: &str,
    values: &Map<String, Value>,
) -> Result<(), DbError> {
    let sql = if values.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table))
    } else {
        let columns: Vec<String> = values.keys().map(|c| quote_ident(c)).collect();
        let placeholders = vec!["?"; values.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns.join(", "),
            placeholders
        )
    };

    let mut query = sqlx::query(&sql);
    for value in values.values() {
        query = bind_value(query, value);
    }
    query.execute(&mut *conn).await?;

    Ok(())
}

/// Number of rows in `table`.
pub async fn count_rows(conn: &mut SqliteConnection, table: &str) -> Result<i64, DbError> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    let count: i64 = sqlx::query_scalar::<_, i64>(&sql).fetch_one(&mut *conn).await?;
    Ok(count)
}

// ---------------------------------------------------------------------------
// Value conversion
// ---------------------------------------------------------------------------

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        // Arrays and objects are stored as their JSON text.
        other => query.bind(other.to_string()),
    }
}

fn row_to_map(row: &SqliteRow) -> Result<Map<String, Value>, DbError> {
    let mut values = Map::new();

    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            // SQLite reports the storage class of the stored value here,
            // not the declared column type.
            let storage = raw.type_info().name().to_owned();
            match storage.as_str() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(idx)?),
                "REAL" => Value::from(row.try_get::<f64, _>(idx)?),
                "TEXT" => Value::from(row.try_get::<String, _>(idx)?),
                other => {
                    return Err(DbError::UnsupportedColumnType {
                        column: column.name().to_owned(),
                        type_name: other.to_owned(),
                    })
                }
            }
        };

        values.insert(column.name().to_owned(), value);
    }

    Ok(values)
}
